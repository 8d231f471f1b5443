// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR recognizer backed by the pure-Rust `ocrs` engine.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature:
//
// ```toml
// schwaerz-document = { path = "crates/schwaerz-document", features = ["ocr"] }
// ```
//
// # Models
//
// The engine needs `text-detection.rten` and `text-recognition.rten`. Running
// `ocrs-cli` once downloads both to `$XDG_CACHE_HOME/ocrs` (typically
// `~/.cache/ocrs`), which is also the default lookup directory here.
//
// # Detections
//
// Every recognized word becomes one detection with its axis-aligned bounding
// box. `ocrs` reports no per-word score, so confidence is always 1.0 and the
// low-confidence rule never fires for this backend.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams, TextItem};
use rten::Model;
use schwaerz_core::error::{Result, SchwaerzError};
use schwaerz_core::{Detection, Region};
use tracing::{debug, info, instrument};

use super::{ScanPage, TextRecognizer};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Confidence attached to every `ocrs` word.
pub const OCRS_CONFIDENCE: f64 = 1.0;

/// `$XDG_CACHE_HOME/ocrs`, else `~/.cache/ocrs`, else `./ocrs-models`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the two model files.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expect both models inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Fail early with a hint when a model file is missing.
    pub fn validate(&self) -> Result<()> {
        for (role, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(SchwaerzError::OcrError(format!(
                    "{role} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Word-level text recognizer. Load once, share across worker threads.
pub struct OcrEngine {
    engine: OcrsEngine,
}

impl OcrEngine {
    /// Load both models. This is the slow part; `ocrs` and `rten` should be
    /// built in release mode.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        let load = |path: &Path| {
            Model::load_file(path).map_err(|err| {
                SchwaerzError::OcrError(format!(
                    "failed to load model from {}: {err}",
                    path.display()
                ))
            })
        };
        info!("Loading OCR models");
        let detection_model = load(&config.detection_model_path)?;
        let recognition_model = load(&config.recognition_model_path)?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| SchwaerzError::OcrError(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(OcrConfig::from_dir(dir))
    }

    /// Detect, group and read words; one detection per non-blank word.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn recognize_words(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            SchwaerzError::OcrError(format!(
                "failed to create image source ({width}x{height}): {err}"
            ))
        })?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| SchwaerzError::OcrError(format!("OCR preprocessing failed: {err}")))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| SchwaerzError::OcrError(format!("word detection failed: {err}")))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| SchwaerzError::OcrError(format!("line recognition failed: {err}")))?;

        let mut detections = Vec::new();
        for word in lines.iter().flatten().flat_map(|line| line.words()) {
            let text: String = word.chars().iter().map(|c| c.char).collect();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let rect = word.bounding_rect();
            let region = Region::axis_aligned(
                rect.left() as f64,
                rect.top() as f64,
                rect.right() as f64,
                rect.bottom() as f64,
            );
            detections.push(Detection::new(region, text, OCRS_CONFIDENCE)?);
        }

        debug!(
            words = word_rects.len(),
            lines = line_rects.len(),
            detections = detections.len(),
            "OCR recognition complete"
        );
        Ok(detections)
    }
}

impl TextRecognizer for OcrEngine {
    fn name(&self) -> &str {
        "ocrs"
    }

    fn recognize(&self, page: ScanPage<'_>) -> Result<Vec<Detection>> {
        self.recognize_words(&DynamicImage::ImageLuma8(page.raster.clone()))
    }
}
