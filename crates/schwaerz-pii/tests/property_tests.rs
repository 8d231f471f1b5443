// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Property-based tests for the redaction matcher.

use proptest::prelude::*;
use schwaerz_core::{Detection, PiiKind, PiiMatch, Region};
use schwaerz_pii::RedactionMatcher;
use schwaerz_pii::matcher::mutually_contained;
use schwaerz_text::normalize;

fn det(text: &str) -> Detection {
    Detection::new(Region::axis_aligned(0.0, 0.0, 10.0, 10.0), text, 0.9).unwrap()
}

/// Property: the containment predicate does not depend on argument order.
#[test]
fn proptest_containment_symmetric() {
    proptest!(|(a in "[a-z0-9 .@-]{0,20}", b in "[a-z0-9 .@-]{0,20}")| {
        prop_assert_eq!(mutually_contained(&a, &b), mutually_contained(&b, &a));
    });
}

/// Property: swapping the detection text and the PII value gives the same
/// verdict whenever both sides are long enough to be considered.
#[test]
fn proptest_matcher_symmetric() {
    let matcher = RedactionMatcher::default();
    proptest!(|(a in "[A-Za-z0-9 .-]{1,16}", b in "[A-Za-z0-9 .-]{1,16}")| {
        prop_assume!(normalize(&a).chars().count() > 2);
        prop_assume!(normalize(&b).chars().count() > 2);

        let m_a = PiiMatch::new(PiiKind::Person, a.as_str()).unwrap();
        let m_b = PiiMatch::new(PiiKind::Person, b.as_str()).unwrap();
        prop_assert_eq!(
            matcher.is_sensitive(&det(&a), &[m_b]),
            matcher.is_sensitive(&det(&b), &[m_a])
        );
    });
}

/// Property: with no PII matches, nothing is sensitive.
#[test]
fn proptest_empty_matches_never_sensitive() {
    let matcher = RedactionMatcher::default();
    proptest!(|(text in "\\PC{0,40}")| {
        prop_assert!(!matcher.is_sensitive(&det(&text), &[]));
    });
}

/// Property: a detection whose text is exactly a PII value is sensitive once
/// its normalized form is longer than two characters.
#[test]
fn proptest_exact_value_sensitive() {
    let matcher = RedactionMatcher::default();
    proptest!(|(text in "[A-Za-z0-9]{3,20}")| {
        let m = PiiMatch::new(PiiKind::Phone, text.as_str()).unwrap();
        prop_assert!(matcher.is_sensitive(&det(&text), &[m]));
    });
}
