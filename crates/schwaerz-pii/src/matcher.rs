// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction matcher — decides which detections carry PII.
//
// PII values come from the joined transcript and carry no link back to the
// detection they were read from. A detection is flagged when its normalized
// text and a normalized PII value contain one another. A value spread over
// several detections is only caught piecewise: each piece that is contained
// in the value and long enough on its own matches, short pieces slip through,
// and nothing ties the pieces together.

use schwaerz_core::config::MatcherConfig;
use schwaerz_core::{Detection, PiiMatch, RedactionDecision};
use schwaerz_text::normalize;
use tracing::{debug, instrument};

/// Symmetric containment: `a` contains `b` or `b` contains `a`.
pub fn mutually_contained(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Flags detections whose text overlaps a PII value.
#[derive(Debug, Clone, Default)]
pub struct RedactionMatcher {
    config: MatcherConfig,
}

impl RedactionMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Whether `detection` must be redacted given `matches`.
    ///
    /// Stops at the first qualifying match. Always `false` when `matches`
    /// is empty or the normalized detection text is too short.
    pub fn is_sensitive(&self, detection: &Detection, matches: &[PiiMatch]) -> bool {
        let values: Vec<String> = matches.iter().map(|m| normalize(m.value())).collect();
        self.matches_any(detection.text(), &values)
    }

    /// Decide every detection against the same match set. Match values are
    /// normalized once.
    #[instrument(skip_all, fields(detections = detections.len(), matches = matches.len()))]
    pub fn decide(&self, detections: &[Detection], matches: &[PiiMatch]) -> Vec<RedactionDecision> {
        let values: Vec<String> = matches.iter().map(|m| normalize(m.value())).collect();
        let decisions: Vec<_> = detections
            .iter()
            .map(|detection| RedactionDecision {
                detection: detection.clone(),
                sensitive: self.matches_any(detection.text(), &values),
            })
            .collect();
        debug!(
            sensitive = decisions.iter().filter(|d| d.sensitive).count(),
            "redaction decisions made"
        );
        decisions
    }

    fn matches_any(&self, text: &str, normalized_values: &[String]) -> bool {
        let clean = normalize(text);
        if clean.chars().count() <= self.config.min_normalized_len {
            return false;
        }
        normalized_values
            .iter()
            .any(|value| mutually_contained(&clean, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schwaerz_core::{PiiKind, Region};

    fn det(text: &str) -> Detection {
        Detection::new(Region::axis_aligned(0.0, 0.0, 10.0, 10.0), text, 0.9).unwrap()
    }

    fn pii(kind: PiiKind, value: &str) -> PiiMatch {
        PiiMatch::new(kind, value).unwrap()
    }

    #[test]
    fn exact_phone_is_sensitive() {
        let matches = [pii(PiiKind::Phone, "9876543210")];
        let matcher = RedactionMatcher::default();
        assert!(matcher.is_sensitive(&det("9876543210"), &matches));
        assert!(!matcher.is_sensitive(&det("Hello"), &matches));
    }

    #[test]
    fn containment_either_way_after_normalization() {
        let matcher = RedactionMatcher::default();
        // detection inside value
        let matches = [pii(PiiKind::Person, "Jane Doe")];
        assert!(matcher.is_sensitive(&det("DOE,"), &matches));
        // value inside detection
        let matches = [pii(PiiKind::Phone, "+91 98765-43210")];
        assert!(matcher.is_sensitive(&det("Tel:+919876543210"), &matches));
    }

    #[test]
    fn short_detections_never_match() {
        let matches = [pii(PiiKind::Person, "Al Smith")];
        let matcher = RedactionMatcher::default();
        assert!(!matcher.is_sensitive(&det("Al"), &matches));
        assert!(!matcher.is_sensitive(&det("A.l."), &matches));
        assert!(matcher.is_sensitive(&det("Smi"), &matches));
    }

    #[test]
    fn empty_match_set_flags_nothing() {
        let matcher = RedactionMatcher::default();
        for text in ["9876543210", "Hello", "jane@doe.com", ""] {
            assert!(!matcher.is_sensitive(&det(text), &[]));
        }
    }

    #[test]
    fn split_value_matches_piecewise() {
        // A number recognized as two boxes: each half is contained in the
        // value, so both match on their own.
        let matches = [pii(PiiKind::Phone, "987 654 3210")];
        let matcher = RedactionMatcher::default();
        assert!(matcher.is_sensitive(&det("98765"), &matches));
        assert!(matcher.is_sensitive(&det("43210"), &matches));
        // a box spanning more than the value plus unrelated text still matches
        assert!(matcher.is_sensitive(&det("call 9876543210 now"), &matches));
        // a box straddling the end of the value does not
        assert!(!matcher.is_sensitive(&det("3210 now"), &matches));
    }

    #[test]
    fn decide_keeps_detection_order() {
        let detections = [det("Hello"), det("9876543210"), det("world")];
        let matches = [pii(PiiKind::Phone, "9876543210")];
        let decisions = RedactionMatcher::default().decide(&detections, &matches);
        let flags: Vec<_> = decisions.iter().map(|d| d.sensitive).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert_eq!(decisions[1].detection.text(), "9876543210");
    }

    #[test]
    fn minimum_length_is_configurable() {
        let matcher = RedactionMatcher::new(MatcherConfig {
            min_normalized_len: 5,
        });
        let matches = [pii(PiiKind::Person, "Jane Doe")];
        assert!(!matcher.is_sensitive(&det("Jane"), &matches));
        assert!(matcher.is_sensitive(&det("Jane Doe"), &matches));
    }
}
