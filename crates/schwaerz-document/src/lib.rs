// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// schwaerz-document — Raster-side collaborators of the redaction pipeline.
//
// Provides image loading and encoding, scan normalization (ruled-line removal
// and local contrast equalization), text recognition behind the
// `TextRecognizer` trait (replayed detections from a JSON sidecar, or the
// `ocrs` engine with the "ocr" feature), and painting of redaction boxes.

pub mod image;
pub mod redact;
pub mod scan;

// Re-export the primary items so callers can use `schwaerz_document::SourceImage` etc.
pub use image::source::{SourceImage, save_dynamic};
pub use redact::{paint_redactions, redaction_rect};
pub use scan::enhance::{ScanEnhancer, ScanNormalizer};
pub use scan::sidecar::SidecarRecognizer;
pub use scan::{ImageNormalizer, ScanPage, TextRecognizer};

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrEngine;
