// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Schwärz.

use thiserror::Error;

use crate::types::{DocumentId, Stage};

/// Top-level error type for all Schwärz operations.
#[derive(Debug, Error)]
pub enum SchwaerzError {
    // -- Input / configuration --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid PII pattern: {0}")]
    Pattern(String),

    // -- Collaborators --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("entity recognition failed: {0}")]
    EntityRecognition(String),

    // -- Per-document failure, carries the stage it happened in --
    #[error("document {document} failed during {stage}: {cause}")]
    Document {
        document: DocumentId,
        stage: Stage,
        cause: Box<SchwaerzError>,
    },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchwaerzError {
    /// Wrap this error with the document and pipeline stage it occurred in.
    pub fn in_document(self, document: &DocumentId, stage: Stage) -> Self {
        match self {
            // Already attributed further down; keep the innermost context.
            err @ Self::Document { .. } => err,
            other => Self::Document {
                document: document.clone(),
                stage,
                cause: Box::new(other),
            },
        }
    }

    /// The stage a per-document failure happened in, if attributed.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Document { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SchwaerzError>;
