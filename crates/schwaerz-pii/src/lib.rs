// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// schwaerz-pii — PII detection over OCR transcripts and redaction matching.
//
// - `extractor`: regex ensemble (phone, email, date) plus an optional entity source
// - `entity`: the entity-recognizer capability and a dictionary-backed implementation
// - `matcher`: maps free-text PII values back onto individual detections

pub mod entity;
pub mod extractor;
pub mod matcher;

pub use entity::{EntityRecognizer, EntitySpan, GazetteerRecognizer, UnavailableRecognizer};
pub use extractor::{EntityStatus, Extraction, PiiExtractor};
pub use matcher::RedactionMatcher;
