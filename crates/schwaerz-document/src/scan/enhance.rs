// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan normalization — ruled-line removal and contrast-limited adaptive
// histogram equalization (CLAHE) on the grayscale raster fed to recognition.
//
// Both passes are plain per-pixel loops over `GrayImage` buffers. The source
// image is never touched; redaction is painted on the original pixels.

use std::collections::VecDeque;

use image::{DynamicImage, GrayImage};
use schwaerz_core::config::NormalizeConfig;
use schwaerz_core::error::Result;
use tracing::{debug, instrument};

use super::ImageNormalizer;

/// Chainable grayscale cleanup steps.
///
/// ```rust,no_run
/// use schwaerz_document::ScanEnhancer;
///
/// let img = image::open("form.jpg").unwrap();
/// let clean = ScanEnhancer::from_dynamic(&img)
///     .remove_horizontal_lines(40)
///     .equalize_local_contrast(2.0, 8)
///     .into_gray();
/// ```
pub struct ScanEnhancer {
    gray: GrayImage,
}

impl ScanEnhancer {
    /// Start from an 8-bit grayscale copy of `image`.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self {
            gray: image.to_luma8(),
        }
    }

    pub fn from_gray(gray: GrayImage) -> Self {
        Self { gray }
    }

    /// Erase dark horizontal strokes at least `kernel_width` pixels long.
    ///
    /// The image is inverted so ink is bright, opened with a `kernel_width`
    /// x 1 rectangle (erode then dilate along each row), and the opened
    /// result (the long strokes) is subtracted before inverting back. Text
    /// glyphs are shorter than the kernel and survive the erosion as zero.
    /// A width of zero or one leaves the image unchanged.
    #[instrument(skip(self), fields(width = self.gray.width(), height = self.gray.height()))]
    pub fn remove_horizontal_lines(mut self, kernel_width: u32) -> Self {
        if kernel_width <= 1 {
            return self;
        }
        let width = self.gray.width() as usize;
        let kernel = kernel_width as usize;
        // Anchor sits at the kernel centre, like a symmetric structuring element.
        let before = kernel / 2;
        let after = kernel - 1 - before;

        let mut erased = 0u64;
        for row in self.gray.chunks_exact_mut(width.max(1)) {
            let inverted: Vec<u8> = row.iter().map(|&v| 255 - v).collect();
            let eroded = sliding_extreme(&inverted, before, after, Extreme::Min);
            // Dilation uses the reflected element.
            let lines = sliding_extreme(&eroded, after, before, Extreme::Max);
            for (pixel, (&ink, &line)) in row.iter_mut().zip(inverted.iter().zip(&lines)) {
                if line > 0 {
                    erased += 1;
                }
                *pixel = 255 - ink.saturating_sub(line);
            }
        }
        debug!(erased, "horizontal lines removed");
        self
    }

    /// Contrast-limited adaptive histogram equalization.
    ///
    /// The image is split into at most `grid` x `grid` tiles. Each tile gets
    /// its own equalization lookup table, with histogram bins clipped at
    /// `clip_limit` times the mean bin height and the excess spread evenly.
    /// Pixels are mapped by bilinear interpolation between the four nearest
    /// tile tables. A grid of zero leaves the image unchanged.
    #[instrument(skip(self), fields(width = self.gray.width(), height = self.gray.height()))]
    pub fn equalize_local_contrast(mut self, clip_limit: f32, grid: u32) -> Self {
        let (width, height) = self.gray.dimensions();
        if grid == 0 || width == 0 || height == 0 {
            return self;
        }

        let tile_w = width.div_ceil(grid.min(width));
        let tile_h = height.div_ceil(grid.min(height));
        let tiles_x = width.div_ceil(tile_w);
        let tiles_y = height.div_ceil(tile_h);

        let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let x0 = tx * tile_w;
                let y0 = ty * tile_h;
                let x1 = (x0 + tile_w).min(width);
                let y1 = (y0 + tile_h).min(height);
                luts.push(tile_lut(&self.gray, (x0, y0, x1, y1), clip_limit));
            }
        }

        let source = self.gray.clone();
        for (x, y, pixel) in self.gray.enumerate_pixels_mut() {
            let value = source.get_pixel(x, y).0[0] as usize;
            let (tx0, tx1, ax) = neighbours(x, tile_w, tiles_x);
            let (ty0, ty1, ay) = neighbours(y, tile_h, tiles_y);
            let at = |tx: u32, ty: u32| luts[(ty * tiles_x + tx) as usize][value] as f32;

            let top = at(tx0, ty0) * (1.0 - ax) + at(tx1, ty0) * ax;
            let bottom = at(tx0, ty1) * (1.0 - ax) + at(tx1, ty1) * ax;
            let mapped = top * (1.0 - ay) + bottom * ay;
            pixel.0[0] = mapped.round().clamp(0.0, 255.0) as u8;
        }
        debug!(tiles_x, tiles_y, clip_limit, "local contrast equalized");
        self
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn into_gray(self) -> GrayImage {
        self.gray
    }
}

/// The configured normalization: grayscale, line removal, then CLAHE.
#[derive(Debug, Clone, Default)]
pub struct ScanNormalizer {
    config: NormalizeConfig,
}

impl ScanNormalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }
}

impl ImageNormalizer for ScanNormalizer {
    fn normalize(&self, image: &DynamicImage) -> Result<GrayImage> {
        Ok(ScanEnhancer::from_dynamic(image)
            .remove_horizontal_lines(self.config.line_kernel_width)
            .equalize_local_contrast(self.config.clahe_clip_limit, self.config.clahe_tile_grid)
            .into_gray())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Min,
    Max,
}

/// Running minimum or maximum over `row`. The window for index `i` covers
/// `i - before ..= i + after`, clipped to the row. Monotonic deque, O(n).
fn sliding_extreme(row: &[u8], before: usize, after: usize, extreme: Extreme) -> Vec<u8> {
    let n = row.len();
    let mut out = Vec::with_capacity(n);
    let mut window: VecDeque<usize> = VecDeque::new();
    let mut next = 0;

    for i in 0..n {
        let hi = (i + after).min(n - 1);
        while next <= hi {
            let value = row[next];
            while let Some(&back) = window.back() {
                let dominated = match extreme {
                    Extreme::Min => row[back] >= value,
                    Extreme::Max => row[back] <= value,
                };
                if !dominated {
                    break;
                }
                window.pop_back();
            }
            window.push_back(next);
            next += 1;
        }

        let lo = i.saturating_sub(before);
        while window.front().is_some_and(|&front| front < lo) {
            window.pop_front();
        }
        out.push(window.front().map_or(row[i], |&j| row[j]));
    }
    out
}

/// Clipped-histogram equalization table for one tile.
fn tile_lut(gray: &GrayImage, (x0, y0, x1, y1): (u32, u32, u32, u32), clip_limit: f32) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[gray.get_pixel(x, y).0[0] as usize] += 1;
        }
    }
    let area = (x1 - x0) * (y1 - y0);

    let clip = ((clip_limit * area as f32 / 256.0) as u32).max(1);
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    let share = excess / 256;
    let residual = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += share + u32::from(i < residual);
    }

    let mut lut = [0u8; 256];
    let mut cdf = 0u32;
    let scale = 255.0 / area.max(1) as f32;
    for (value, bin) in hist.iter().enumerate() {
        cdf += bin;
        lut[value] = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// The two tile indices whose centres bracket `pos`, and the weight of the
/// second one.
fn neighbours(pos: u32, tile: u32, tiles: u32) -> (u32, u32, f32) {
    let f = (pos as f32 + 0.5) / tile as f32 - 0.5;
    let first = (f.floor().max(0.0) as u32).min(tiles - 1);
    let second = (first + 1).min(tiles - 1);
    let weight = if first == second {
        0.0
    } else {
        (f - first as f32).clamp(0.0, 1.0)
    };
    (first, second, weight)
}
