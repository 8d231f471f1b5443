// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — normalization of the raster handed to recognition, and
// the recognizers that turn it into detections.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use schwaerz_core::Detection;
use schwaerz_core::error::Result;

pub mod enhance;
pub mod sidecar;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use enhance::{ScanEnhancer, ScanNormalizer};
pub use sidecar::SidecarRecognizer;

#[cfg(feature = "ocr")]
pub use ocr::OcrEngine;

/// Turns a decoded scan into the grayscale raster recognition runs on.
pub trait ImageNormalizer: Send + Sync {
    fn normalize(&self, image: &DynamicImage) -> Result<GrayImage>;
}

/// What a recognizer gets to look at for one document.
#[derive(Debug, Clone, Copy)]
pub struct ScanPage<'a> {
    /// Path of the source image.
    pub source: &'a Path,
    /// Normalized raster, same dimensions as the source.
    pub raster: &'a GrayImage,
}

/// Produces detections for one page.
///
/// Shared across worker threads, so implementations must be `Send + Sync`.
/// Every returned [`Detection`] has already passed confidence validation.
pub trait TextRecognizer: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &str;

    /// Recognize text on `page`. An empty vector is a valid result.
    fn recognize(&self, page: ScanPage<'_>) -> Result<Vec<Detection>>;
}
