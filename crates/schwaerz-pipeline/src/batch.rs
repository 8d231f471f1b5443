// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch runner — processes a folder of scans on the current rayon pool.
//
// Documents share nothing mutable. A failure in one document (at any stage,
// persistence included) is recorded in the summary and never stops the rest.
// Panics raised by a collaborator are caught per document and recorded the
// same way.
// Outputs per document, in the output folder:
//
//   extracted_<file>_CLEANED.txt   human-readable report
//   extracted_<file>.json          machine-readable report
//   redacted_<file>                redacted image, same format as the input
//   debug_clean_<file>             normalized raster (optional)

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use image::DynamicImage;
use rayon::prelude::*;
use schwaerz_core::error::{Result, SchwaerzError};
use schwaerz_core::{DocumentId, Stage};
use schwaerz_document::save_dynamic;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::orchestrator::{Pipeline, ProcessedDocument, document_id};
use crate::report::DocumentReport;

/// Input file extensions, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// List supported images directly inside `dir`, sorted by file name.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            inputs.push(path);
        }
    }
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(inputs)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Where and what to write for each document.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    dir: PathBuf,
    save_debug: bool,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            save_debug: false,
        }
    }

    /// Also write the normalized raster as `debug_clean_<file>`.
    pub fn with_debug(mut self, save_debug: bool) -> Self {
        self.save_debug = save_debug;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn report_text_path(&self, document: &DocumentId) -> PathBuf {
        self.dir.join(format!("extracted_{document}_CLEANED.txt"))
    }

    pub fn report_json_path(&self, document: &DocumentId) -> PathBuf {
        self.dir.join(format!("extracted_{document}.json"))
    }

    pub fn redacted_path(&self, document: &DocumentId) -> PathBuf {
        self.dir.join(format!("redacted_{document}"))
    }

    pub fn debug_path(&self, document: &DocumentId) -> PathBuf {
        self.dir.join(format!("debug_clean_{document}"))
    }

    /// Write every output for one processed document.
    pub fn persist(&self, processed: &ProcessedDocument) -> Result<()> {
        let document = &processed.report.document;
        std::fs::create_dir_all(&self.dir)?;

        std::fs::write(self.report_text_path(document), processed.report.to_string())?;
        std::fs::write(self.report_json_path(document), processed.report.to_json()?)?;
        save_dynamic(&processed.redacted, self.redacted_path(document))?;
        if self.save_debug {
            let normalized = DynamicImage::ImageLuma8(processed.normalized.clone());
            save_dynamic(&normalized, self.debug_path(document))?;
        }
        Ok(())
    }
}

/// A document that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub document: DocumentId,
    /// Stage the failure was attributed to, when known.
    pub stage: Option<Stage>,
    pub cause: String,
}

impl DocumentFailure {
    fn from_error(document: DocumentId, err: SchwaerzError) -> Self {
        let stage = err.stage();
        let cause = match err {
            SchwaerzError::Document { cause, .. } => cause.to_string(),
            other => other.to_string(),
        };
        Self {
            document,
            stage,
            cause,
        }
    }
}

/// Outcome of one batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub reports: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    /// True when there was work and none of it succeeded.
    pub fn all_failed(&self) -> bool {
        self.reports.is_empty() && !self.failures.is_empty()
    }
}

/// Process and persist every input in parallel.
#[instrument(skip_all, fields(inputs = inputs.len(), output = %layout.dir().display()))]
pub fn run_batch(pipeline: &Pipeline, inputs: &[PathBuf], layout: &OutputLayout) -> BatchSummary {
    if inputs.is_empty() {
        warn!("no input images to process");
        return BatchSummary::default();
    }

    let outcomes: Vec<_> = inputs
        .par_iter()
        .map(|path| {
            let document = document_id(path);
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                pipeline.process_file(path).and_then(|processed| {
                    layout
                        .persist(&processed)
                        .map_err(|err| err.in_document(&document, Stage::Persist))?;
                    Ok(processed.report)
                })
            }));
            (document, outcome)
        })
        .collect();

    let mut summary = BatchSummary::default();
    for (document, outcome) in outcomes {
        match outcome {
            Ok(Ok(report)) => summary.reports.push(report),
            Ok(Err(err)) => {
                error!(document = %document, error = %err, "document failed");
                summary
                    .failures
                    .push(DocumentFailure::from_error(document, err));
            }
            Err(payload) => {
                let cause = format!("panicked: {}", panic_message(payload.as_ref()));
                error!(document = %document, cause = %cause, "document panicked");
                summary.failures.push(DocumentFailure {
                    document,
                    stage: None,
                    cause,
                });
            }
        }
    }

    info!(
        succeeded = summary.reports.len(),
        failed = summary.failures.len(),
        "batch complete"
    );
    summary
}

/// Text of a panic payload; `panic!` produces either `&str` or `String`.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}
