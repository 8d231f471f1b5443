// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Named-entity recognition capability.
//
// The extractor only needs `(label, text)` spans for a transcript. Any model
// can sit behind `EntityRecognizer`; the one shipped here is a gazetteer that
// looks up known names, organisations and places from a JSON dictionary:
//
// ```json
// { "PERSON": ["Jane Doe"], "ORG": ["Acme Corp"], "GPE": ["Mumbai"] }
// ```

use std::collections::BTreeMap;
use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};
use schwaerz_core::error::{Result, SchwaerzError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use schwaerz_text::normalize::is_word_char;

/// One labelled entity span reported by a recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Upper-case entity label, e.g. `PERSON`, `ORG`, `GPE`, `DATE`.
    pub label: String,
    /// The entity text as it appears in the transcript.
    pub text: String,
}

impl EntitySpan {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// A named-entity source the PII extractor can consult.
///
/// Implementations are loaded once per process and shared read-only across
/// documents, hence `Send + Sync`.
pub trait EntityRecognizer: Send + Sync {
    /// Short name used in reports and logs.
    fn name(&self) -> &str;

    /// Whether the recognizer can serve requests. The pipeline checks this
    /// before calling [`recognize`](Self::recognize) and reports a skipped
    /// entity pass when it is `false`.
    fn is_available(&self) -> bool;

    /// Why the recognizer cannot serve requests, or `None` when it can.
    fn unavailable_reason(&self) -> Option<String> {
        (!self.is_available()).then(|| format!("entity recognizer {} unavailable", self.name()))
    }

    /// Return entity spans in the order they occur.
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Stand-in for an entity source that failed to initialise.
///
/// Keeps the failure so every report can say why entity detection was
/// skipped instead of looking as if none was configured.
#[derive(Debug, Clone)]
pub struct UnavailableRecognizer {
    name: String,
    reason: String,
}

impl UnavailableRecognizer {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl EntityRecognizer for UnavailableRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        false
    }

    fn unavailable_reason(&self) -> Option<String> {
        Some(self.reason.clone())
    }

    fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>> {
        Err(SchwaerzError::EntityRecognition(self.reason.clone()))
    }
}

/// Dictionary-backed recognizer: case-insensitive, whole-word,
/// leftmost-longest lookup of known phrases.
///
/// Case folding is per character and only where the lower-case form has the
/// same UTF-8 length, so offsets in the folded text are offsets in the
/// original. Characters whose lower case changes length (`İ`, for one) must
/// match exactly.
pub struct GazetteerRecognizer {
    name: String,
    automaton: Option<AhoCorasick>,
    /// Label of each phrase, indexed by pattern id.
    labels: Vec<String>,
}

impl GazetteerRecognizer {
    /// Build from `(label, phrase)` pairs. Blank phrases are ignored and
    /// labels are upper-cased.
    pub fn from_entries<L, P>(entries: impl IntoIterator<Item = (L, P)>) -> Result<Self>
    where
        L: AsRef<str>,
        P: AsRef<str>,
    {
        let mut phrases = Vec::new();
        let mut labels = Vec::new();
        for (label, phrase) in entries {
            let phrase = phrase.as_ref().trim();
            if phrase.is_empty() {
                continue;
            }
            phrases.push(fold_case(phrase));
            labels.push(label.as_ref().trim().to_uppercase());
        }

        let automaton = if phrases.is_empty() {
            None
        } else {
            let ac = AhoCorasick::builder()
                .match_kind(MatchKind::Standard)
                .build(&phrases)
                .map_err(|err| {
                    SchwaerzError::EntityRecognition(format!("failed to build gazetteer: {err}"))
                })?;
            Some(ac)
        };

        debug!(phrases = labels.len(), "gazetteer built");
        Ok(Self {
            name: "gazetteer".to_owned(),
            automaton,
            labels,
        })
    }

    /// Load a JSON dictionary mapping labels to phrase lists.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|err| {
            SchwaerzError::EntityRecognition(format!(
                "failed to read gazetteer {}: {err}",
                path.display()
            ))
        })?;
        let dictionary: BTreeMap<String, Vec<String>> = serde_json::from_str(&data)?;

        let entries = dictionary
            .iter()
            .flat_map(|(label, phrases)| phrases.iter().map(move |p| (label.as_str(), p.as_str())));
        let mut recognizer = Self::from_entries(entries)?;
        recognizer.name = format!("gazetteer:{}", path.display());

        info!(phrases = recognizer.labels.len(), "gazetteer loaded");
        Ok(recognizer)
    }

    /// Number of phrases in the dictionary.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.automaton.is_some()
    }

    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let Some(automaton) = &self.automaton else {
            return Err(SchwaerzError::EntityRecognition(
                "gazetteer has no entries".into(),
            ));
        };

        // Every whole-word candidate, then leftmost-longest among those, so a
        // longer phrase glued to a word never hides a shorter one that fits.
        let folded = fold_case(text);
        let mut candidates: Vec<_> = automaton
            .find_overlapping_iter(&folded)
            .filter(|m| on_word_boundary(text, m.start(), m.end()))
            .collect();
        candidates.sort_by(|a, b| a.start().cmp(&b.start()).then(b.end().cmp(&a.end())));

        let mut spans = Vec::new();
        let mut covered = 0;
        for m in candidates {
            if m.start() < covered {
                continue;
            }
            covered = m.end();
            spans.push(EntitySpan::new(
                &self.labels[m.pattern().as_usize()],
                &text[m.range()],
            ));
        }
        Ok(spans)
    }
}

/// Lower-case `text` without moving any byte offset.
fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
                _ => c,
            }
        })
        .collect()
}

/// True when `text[start..end]` is not glued to word characters on either side.
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}
