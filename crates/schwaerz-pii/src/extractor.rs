// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PII extractor — an ensemble of regex matchers plus an optional entity source.
//
// Every source appends to one collection in a fixed order: configured
// patterns in list order (phone, email, date by default), then entities in
// the order the recognizer reports them. Nothing is deduplicated or merged;
// the same text may show up under several kinds.

use regex::Regex;
use schwaerz_core::config::PiiConfig;
use schwaerz_core::error::{Result, SchwaerzError};
use schwaerz_core::{PiiKind, PiiMatch};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::entity::{EntityRecognizer, EntitySpan};

/// Whether entity-based detection contributed to an extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntityStatus {
    /// The recognizer ran; `entities` spans passed the label/length filter.
    Applied { recognizer: String, entities: usize },
    /// Extraction was pattern-only.
    Skipped { reason: String },
}

impl EntityStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Result of running the extractor over one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Matches in discovery order.
    pub matches: Vec<PiiMatch>,
    pub entity_status: EntityStatus,
}

/// Compiled PII extraction ensemble.
#[derive(Debug, Clone)]
pub struct PiiExtractor {
    patterns: Vec<(PiiKind, Regex)>,
    entity_labels: Vec<PiiKind>,
    min_entity_len: usize,
}

impl PiiExtractor {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`SchwaerzError::Pattern`] if any pattern fails to compile.
    pub fn new(config: &PiiConfig) -> Result<Self> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|re| (p.kind, re))
                    .map_err(|err| SchwaerzError::Pattern(format!("{} pattern: {err}", p.kind)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            entity_labels: config.entity_labels.clone(),
            min_entity_len: config.min_entity_len,
        })
    }

    /// Run the whole ensemble over `transcript`.
    ///
    /// Entity detection is a capability: with no recognizer, an unavailable
    /// one, or one that fails at run time, extraction continues pattern-only
    /// and [`EntityStatus::Skipped`] records why.
    #[instrument(skip_all, fields(chars = transcript.len()))]
    pub fn extract(
        &self,
        transcript: &str,
        entities: Option<&dyn EntityRecognizer>,
    ) -> Extraction {
        let mut matches = self.extract_patterns(transcript);

        let entity_status = match entities {
            None => EntityStatus::Skipped {
                reason: "no entity recognizer configured".into(),
            },
            Some(recognizer) if !recognizer.is_available() => {
                let reason = recognizer.unavailable_reason().unwrap_or_else(|| {
                    format!("entity recognizer {} unavailable", recognizer.name())
                });
                warn!(recognizer = recognizer.name(), reason = %reason, "entity recognizer unavailable");
                EntityStatus::Skipped { reason }
            }
            Some(recognizer) => match recognizer.recognize(transcript) {
                Ok(spans) => {
                    let found = self.filter_entities(&spans);
                    let count = found.len();
                    matches.extend(found);
                    EntityStatus::Applied {
                        recognizer: recognizer.name().to_owned(),
                        entities: count,
                    }
                }
                Err(err) => {
                    warn!(recognizer = recognizer.name(), error = %err, "entity recognition failed");
                    EntityStatus::Skipped {
                        reason: err.to_string(),
                    }
                }
            },
        };

        info!(
            matches = matches.len(),
            entities = entity_status.is_applied(),
            "PII extraction complete"
        );
        Extraction {
            matches,
            entity_status,
        }
    }

    /// Pattern matches only: every non-overlapping match of each pattern,
    /// left to right, patterns in configured order.
    pub fn extract_patterns(&self, transcript: &str) -> Vec<PiiMatch> {
        let mut matches = Vec::new();
        for (kind, regex) in &self.patterns {
            let before = matches.len();
            matches.extend(
                regex
                    .find_iter(transcript)
                    .filter_map(|m| PiiMatch::new(*kind, m.as_str())),
            );
            debug!(kind = %kind, found = matches.len() - before, "pattern scanned");
        }
        matches
    }

    /// Keep spans whose label is allow-listed and whose text is longer than
    /// the minimum entity length.
    pub fn filter_entities(&self, spans: &[EntitySpan]) -> Vec<PiiMatch> {
        spans
            .iter()
            .filter(|span| span.text.chars().count() > self.min_entity_len)
            .filter_map(|span| {
                let kind = PiiKind::from_label(&span.label)?;
                if !self.entity_labels.contains(&kind) {
                    return None;
                }
                PiiMatch::new(kind, span.text.as_str())
            })
            .collect()
    }
}
