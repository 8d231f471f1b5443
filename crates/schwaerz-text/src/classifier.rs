// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Readability classifier — separates genuine text from recognition noise.
//
// The rules run in a fixed order and the first one that fires decides:
//
// 1. confidence below threshold          → LowConfidence
// 2. trimmed text too short              → TooShort
// 3. more than half special characters   → TooManySpecialChars
// 4. long run of consonants              → TooManyConsonants
// 5. normalized text too long            → TooLong
// 6. digit-heavy letter/number mix       → WeirdNumberLetterMix
// 7. otherwise                           → Ok

use schwaerz_core::config::ClassifierConfig;
use schwaerz_core::{ClassificationResult, Detection, Reason};
use tracing::{debug, instrument};

use crate::normalize::normalize;

const CONSONANTS: &str = "bcdfghjklmnpqrstvwxyz";

/// Heuristic (text, confidence) → accept/reject classifier.
///
/// Pure and deterministic: the verdict depends on the text, the confidence
/// and the thresholds in [`ClassifierConfig`], nothing else.
#[derive(Debug, Clone, Default)]
pub struct ReadabilityClassifier {
    config: ClassifierConfig,
}

impl ReadabilityClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one piece of recognized text. [`Reason::Ok`] means accepted.
    ///
    /// Total over any text; the confidence is assumed to be in `[0, 1]`,
    /// which [`Detection`] guarantees.
    pub fn classify(&self, text: &str, confidence: f64) -> Reason {
        let c = &self.config;

        if confidence < c.min_confidence {
            return Reason::LowConfidence;
        }

        if text.trim().chars().count() < c.min_text_len {
            return Reason::TooShort;
        }

        let special = text
            .chars()
            .filter(|&ch| {
                !ch.is_alphanumeric() && !ch.is_whitespace() && !c.allowed_specials.contains(ch)
            })
            .count();
        if special > text.chars().count() / 2 {
            return Reason::TooManySpecialChars;
        }

        let norm = normalize(text);
        if longest_consonant_run(&norm) >= c.consonant_run {
            return Reason::TooManyConsonants;
        }

        let norm_len = norm.chars().count();
        if norm_len > c.max_normalized_len {
            return Reason::TooLong;
        }

        if norm_len > c.mix_min_len {
            let digits = norm.chars().filter(|ch| ch.is_numeric()).count();
            if digits > 0 && digits < norm_len && digits as f64 > c.max_digit_ratio * norm_len as f64
            {
                return Reason::WeirdNumberLetterMix;
            }
        }

        Reason::Ok
    }

    /// Classify a detection, keeping it alongside the verdict.
    pub fn classify_detection(&self, detection: Detection) -> ClassificationResult {
        let reason = self.classify(detection.text(), detection.confidence());
        ClassificationResult::new(detection, reason)
    }

    /// Classify every detection, preserving input order.
    #[instrument(skip_all, fields(detections = detections.len()))]
    pub fn classify_all(&self, detections: Vec<Detection>) -> Vec<ClassificationResult> {
        let results: Vec<_> = detections
            .into_iter()
            .map(|d| self.classify_detection(d))
            .collect();
        let accepted = results.iter().filter(|r| r.accepted).count();
        debug!(accepted, rejected = results.len() - accepted, "classification complete");
        results
    }
}

/// Length of the longest run of consecutive English consonants.
fn longest_consonant_run(norm: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in norm.chars() {
        if CONSONANTS.contains(ch) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
