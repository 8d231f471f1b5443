// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-document report model.
//
// `DocumentReport` is serialized as JSON for machines and rendered through
// `Display` as the human-readable `_CLEANED.txt` file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use schwaerz_core::error::Result;
use schwaerz_core::{ClassificationResult, DocumentId, PiiMatch, Reason};
use schwaerz_pii::EntityStatus;
use serde::Serialize;
use uuid::Uuid;

/// Width of the `=` rules in the rendered report.
const RULE_WIDTH: usize = 80;

/// One rejected detection kept as an example.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedEntry {
    pub text: String,
    pub confidence: f64,
    pub reason: Reason,
}

/// Classifier outcome counts for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// `accepted / total`, or 0 when there were no detections.
    pub acceptance_rate: f64,
    /// Rejection count per reason.
    pub reasons: BTreeMap<Reason, usize>,
    /// The first rejected detections, in recognition order.
    pub rejected_sample: Vec<RejectedEntry>,
}

impl ClassificationReport {
    /// Summarize `results`, keeping at most `sample_limit` rejected examples.
    pub fn from_results(results: &[ClassificationResult], sample_limit: usize) -> Self {
        let total = results.len();
        let accepted = results.iter().filter(|r| r.accepted).count();

        let mut reasons = BTreeMap::new();
        let mut rejected_sample = Vec::new();
        for result in results.iter().filter(|r| !r.accepted) {
            *reasons.entry(result.reason).or_insert(0) += 1;
            if rejected_sample.len() < sample_limit {
                rejected_sample.push(RejectedEntry {
                    text: result.detection.text().to_owned(),
                    confidence: result.detection.confidence(),
                    reason: result.reason,
                });
            }
        }

        let acceptance_rate = if total == 0 {
            0.0
        } else {
            accepted as f64 / total as f64
        };

        Self {
            total,
            accepted,
            rejected: total - accepted,
            acceptance_rate,
            reasons,
            rejected_sample,
        }
    }

    /// `"33.3%"`, or `"N/A"` for a document without detections.
    pub fn acceptance_rate_display(&self) -> String {
        if self.total == 0 {
            "N/A".to_owned()
        } else {
            format!("{:.1}%", self.acceptance_rate * 100.0)
        }
    }
}

/// Everything recorded about one successfully processed document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Shared by every document of one batch run.
    pub run_id: Uuid,
    pub document: DocumentId,
    pub source: PathBuf,
    pub source_sha256: String,
    pub processed_at: DateTime<Utc>,
    /// Name of the recognizer that produced the detections.
    pub recognizer: String,
    pub classification: ClassificationReport,
    /// Character count over all detections, accepted or not.
    pub raw_chars: usize,
    pub transcript: String,
    pub transcript_chars: usize,
    pub transcript_words: usize,
    /// PII in discovery order.
    pub pii: Vec<PiiMatch>,
    pub entity_status: EntityStatus,
    /// Number of boxes painted on the redacted image.
    pub redacted_regions: usize,
}

impl DocumentReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for DocumentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let c = &self.classification;

        writeln!(f, "{rule}")?;
        writeln!(f, "OCR EXTRACTION (Quality Filtered)")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "Source: {}", self.document)?;
        writeln!(f, "SHA-256: {}", self.source_sha256)?;
        writeln!(f, "Processed: {}", self.processed_at.to_rfc3339())?;
        writeln!(f, "Recognizer: {}", self.recognizer)?;
        writeln!(f, "Total detections: {}", c.total)?;
        writeln!(f, "Accepted (readable): {}", c.accepted)?;
        writeln!(f, "Rejected (unreadable): {}", c.rejected)?;
        writeln!(f, "Acceptance rate: {}", c.acceptance_rate_display())?;
        match &self.entity_status {
            EntityStatus::Applied {
                recognizer,
                entities,
            } => writeln!(f, "Entity detection: {recognizer} ({entities} entities)")?,
            EntityStatus::Skipped { reason } => {
                writeln!(f, "Entity detection: skipped ({reason})")?
            }
        }
        writeln!(f, "Redacted regions: {}", self.redacted_regions)?;

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "CLEANED TEXT")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "{}", self.transcript)?;

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "DETECTED PII ({} items)", self.pii.len())?;
        writeln!(f, "{rule}")?;
        for m in &self.pii {
            writeln!(f, "{}: {}", m.kind(), m.value())?;
        }

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "REJECTED TEXT (Low Quality/Unreadable)")?;
        writeln!(f, "{rule}")?;
        for entry in &c.rejected_sample {
            writeln!(
                f,
                "'{}' (confidence: {:.2}) - Reason: {}",
                entry.text, entry.confidence, entry.reason
            )?;
        }
        let omitted = c.rejected - c.rejected_sample.len();
        if omitted > 0 {
            writeln!(f, "... and {omitted} more")?;
        }
        Ok(())
    }
}
