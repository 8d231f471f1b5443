// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source scans — decoding the input bytes and writing output rasters.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use schwaerz_core::error::{Result, SchwaerzError};
use tracing::{debug, instrument};

/// A decoded input scan.
///
/// The raster is kept untouched: normalization works on a grayscale copy and
/// redaction is painted onto the pixels handed out by
/// [`into_dynamic`](Self::into_dynamic).
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    /// Decode a JPEG or PNG (or any other format `image` knows) from memory.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)
            .map_err(|err| SchwaerzError::ImageError(format!("failed to decode image: {err}")))?;
        debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "scan decoded"
        );
        Ok(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }
}

/// Write a raster, inferring the format from the extension of `path`.
///
/// JPEG has no alpha channel, so images carrying one are flattened to RGB
/// before a `.jpg`/`.jpeg` write.
pub fn save_dynamic(image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let is_jpeg = matches!(ImageFormat::from_path(path), Ok(ImageFormat::Jpeg));
    let result = if is_jpeg && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)
    } else {
        image.save(path)
    };
    result.map_err(|err| {
        SchwaerzError::ImageError(format!("failed to save image to {}: {err}", path.display()))
    })
}
