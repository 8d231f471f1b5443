// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sidecar recognizer — replays detections recorded next to each scan.
//
// For `inputs/form.jpg` the detections are read from
// `inputs/form.jpg.detections.json`, a JSON array of
// `{ "region": [[x, y], [x, y], [x, y], [x, y]], "text": "...", "confidence": 0.93 }`
// records. Useful for running the pipeline on output from an external OCR
// service, and for tests.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use schwaerz_core::Detection;
use schwaerz_core::error::{Result, SchwaerzError};
use tracing::{debug, instrument};

use super::{ScanPage, TextRecognizer};

/// File name suffix appended to the source image path.
pub const DEFAULT_SIDECAR_SUFFIX: &str = ".detections.json";

#[derive(Debug, Clone)]
pub struct SidecarRecognizer {
    suffix: String,
}

impl Default for SidecarRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_SIDECAR_SUFFIX)
    }
}

impl SidecarRecognizer {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Where the detections for `source` are expected.
    pub fn sidecar_path(&self, source: &Path) -> PathBuf {
        let mut name: OsString = source.as_os_str().to_owned();
        name.push(&self.suffix);
        PathBuf::from(name)
    }

    /// Read and validate the detections for `source`.
    ///
    /// A confidence outside `[0, 1]` or a malformed record rejects the whole
    /// file with [`SchwaerzError::InvalidInput`].
    #[instrument(skip(self), fields(source = %source.display()))]
    pub fn load(&self, source: &Path) -> Result<Vec<Detection>> {
        let path = self.sidecar_path(source);
        let data = std::fs::read_to_string(&path).map_err(|err| {
            SchwaerzError::OcrError(format!(
                "no readable detections at {}: {err}",
                path.display()
            ))
        })?;
        let detections: Vec<Detection> = serde_json::from_str(&data).map_err(|err| {
            SchwaerzError::InvalidInput(format!(
                "malformed detections in {}: {err}",
                path.display()
            ))
        })?;
        debug!(count = detections.len(), "detections replayed from sidecar");
        Ok(detections)
    }
}

impl TextRecognizer for SidecarRecognizer {
    fn name(&self) -> &str {
        "sidecar"
    }

    fn recognize(&self, page: ScanPage<'_>) -> Result<Vec<Detection>> {
        self.load(page.source)
    }
}
