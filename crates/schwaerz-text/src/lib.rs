// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// schwaerz-text — Text-side processing of raw OCR detections.
//
// Provides the shared normalization used for noise classification and
// redaction matching, the heuristic readability classifier that separates
// real text from recognition noise, and the spatial reading-order assembler
// that turns accepted detections into one transcript.

pub mod classifier;
pub mod normalize;
pub mod reading_order;

pub use classifier::ReadabilityClassifier;
pub use normalize::normalize;
pub use reading_order::{Transcript, assemble};
