// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// schwaerz-pipeline — Runs documents through the redaction pipeline.
//
// `Pipeline` sequences one document through load, normalize, recognize,
// validate, classify, assemble, extract and redact. `batch` fans a folder of
// scans out over a rayon pool, isolates per-document failures and persists
// each document's report and redacted image.

pub mod batch;
pub mod integrity;
pub mod orchestrator;
pub mod report;

pub use batch::{BatchSummary, DocumentFailure, OutputLayout, discover_inputs, run_batch};
pub use orchestrator::{Analysis, Pipeline, ProcessedDocument};
pub use report::{ClassificationReport, DocumentReport, RejectedEntry};
