// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reading-order assembler — approximates reading order with a spatial sort.
//
// Detections are ordered by the top-left corner, y first then x, and joined
// with single spaces. There is no line or column clustering: skewed pages,
// multi-column layouts and vertically overlapping boxes come out in sort
// order, not in the order a person would read them.

use schwaerz_core::Detection;
use tracing::debug;

/// Accepted detections in reading order plus the joined transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    ordered: Vec<Detection>,
    text: String,
}

impl Transcript {
    /// Detections in the order their texts appear in [`text`](Self::text).
    pub fn detections(&self) -> &[Detection] {
        &self.ordered
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_parts(self) -> (Vec<Detection>, String) {
        (self.ordered, self.text)
    }
}

/// Sort detections by `(top_left.y, top_left.x)` ascending. The sort is
/// stable, so exact ties keep their input order.
pub fn sort_reading_order(detections: &mut [Detection]) {
    detections.sort_by(|a, b| {
        let (a, b) = (a.region().top_left(), b.region().top_left());
        a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
    });
}

/// Order the accepted detections and join their texts with single spaces.
pub fn assemble(mut accepted: Vec<Detection>) -> Transcript {
    sort_reading_order(&mut accepted);
    let text = accepted
        .iter()
        .map(Detection::text)
        .collect::<Vec<_>>()
        .join(" ");
    debug!(
        detections = accepted.len(),
        chars = text.chars().count(),
        "transcript assembled"
    );
    Transcript {
        ordered: accepted,
        text,
    }
}
