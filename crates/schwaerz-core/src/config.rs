// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration. Every threshold the pipeline applies lives here so
// it can be tuned from a JSON file without rebuilding.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SchwaerzError};
use crate::types::PiiKind;

/// Top-level settings for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub classifier: ClassifierConfig,
    pub pii: PiiConfig,
    pub matcher: MatcherConfig,
    pub normalize: NormalizeConfig,
    pub report: ReportConfig,
}

/// Readability classifier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Detections below this confidence are rejected outright.
    pub min_confidence: f64,
    /// Minimum length of the trimmed text, in characters.
    pub min_text_len: usize,
    /// Punctuation that does not count as a "special" character.
    pub allowed_specials: String,
    /// Length of a consonant run that marks text as noise.
    pub consonant_run: usize,
    /// Longest normalized text still considered a single readable token.
    pub max_normalized_len: usize,
    /// The digit/letter mix rule only applies above this normalized length.
    pub mix_min_len: usize,
    /// Digit share above which mixed text is rejected.
    pub max_digit_ratio: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.30,
            min_text_len: 2,
            allowed_specials: "-&/.".to_owned(),
            consonant_run: 6,
            max_normalized_len: 20,
            mix_min_len: 5,
            max_digit_ratio: 0.6,
        }
    }
}

/// One regular expression feeding the PII extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub kind: PiiKind,
    pub pattern: String,
}

impl PatternConfig {
    pub fn new(kind: PiiKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }
}

/// Mobile numbers with optional +91 prefix, or 3-3-4 grouped numbers.
pub const DEFAULT_PHONE_PATTERN: &str =
    r"(\+91[\-\s]?)?[6-9]\d{9}|\d{3}[-\.\s]??\d{3}[-\.\s]??\d{4}";
pub const DEFAULT_EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";
pub const DEFAULT_DATE_PATTERN: &str = r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b";

/// PII extractor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PiiConfig {
    /// Patterns run in list order; each contributes all of its matches.
    pub patterns: Vec<PatternConfig>,
    /// Entity labels that count as PII.
    pub entity_labels: Vec<PiiKind>,
    /// Entity texts must be strictly longer than this (in characters).
    pub min_entity_len: usize,
}

impl Default for PiiConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                PatternConfig::new(PiiKind::Phone, DEFAULT_PHONE_PATTERN),
                PatternConfig::new(PiiKind::Email, DEFAULT_EMAIL_PATTERN),
                PatternConfig::new(PiiKind::Date, DEFAULT_DATE_PATTERN),
            ],
            entity_labels: vec![PiiKind::Person, PiiKind::Org, PiiKind::Gpe],
            min_entity_len: 2,
        }
    }
}

/// Redaction matcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Normalized detection text must be strictly longer than this to match.
    pub min_normalized_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_normalized_len: 2,
        }
    }
}

/// Scan normalization settings (ruled-line removal + local contrast).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Width of the horizontal structuring element used to find ruled lines.
    /// Zero disables line removal.
    pub line_kernel_width: u32,
    /// CLAHE clip limit, as a multiple of the mean histogram bin height.
    pub clahe_clip_limit: f32,
    /// CLAHE tiles per axis. Zero disables contrast equalization.
    pub clahe_tile_grid: u32,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            line_kernel_width: 40,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: 8,
        }
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// How many rejected detections are kept as examples in the report.
    pub rejected_sample_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rejected_sample_limit: 10,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON configuration file. Missing fields take
    /// their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        info!(path = %path.display(), "pipeline configuration loaded");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Check that every threshold is in a usable range and every PII
    /// pattern compiles.
    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        if !(0.0..=1.0).contains(&c.min_confidence) {
            return Err(SchwaerzError::Config(format!(
                "classifier.min_confidence must be within [0, 1], got {}",
                c.min_confidence
            )));
        }
        if !(0.0..=1.0).contains(&c.max_digit_ratio) {
            return Err(SchwaerzError::Config(format!(
                "classifier.max_digit_ratio must be within [0, 1], got {}",
                c.max_digit_ratio
            )));
        }
        if c.consonant_run == 0 {
            return Err(SchwaerzError::Config(
                "classifier.consonant_run must be at least 1".into(),
            ));
        }
        if self.pii.patterns.iter().any(|p| p.pattern.is_empty()) {
            return Err(SchwaerzError::Config("pii.patterns contains an empty pattern".into()));
        }
        for p in &self.pii.patterns {
            regex::Regex::new(&p.pattern)
                .map_err(|err| SchwaerzError::Pattern(format!("{} pattern: {err}", p.kind)))?;
        }
        if self.normalize.clahe_tile_grid > 0 && self.normalize.clahe_clip_limit < 1.0 {
            return Err(SchwaerzError::Config(format!(
                "normalize.clahe_clip_limit must be >= 1.0, got {}",
                self.normalize.clahe_clip_limit
            )));
        }
        debug!("pipeline configuration valid");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = PipelineConfig::default();
        assert_eq!(config.classifier.min_confidence, 0.30);
        assert_eq!(config.classifier.min_text_len, 2);
        assert_eq!(config.classifier.consonant_run, 6);
        assert_eq!(config.classifier.max_normalized_len, 20);
        assert_eq!(config.classifier.max_digit_ratio, 0.6);
        assert_eq!(config.matcher.min_normalized_len, 2);
        assert_eq!(config.report.rejected_sample_limit, 10);
        let kinds: Vec<_> = config.pii.patterns.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PiiKind::Phone, PiiKind::Email, PiiKind::Date]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "classifier": { "min_confidence": 0.5 } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.classifier.min_confidence, 0.5);
        assert_eq!(config.classifier.max_normalized_len, 20);
        assert_eq!(config.pii, PiiConfig::default());
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let mut config = PipelineConfig::default();
        config.classifier.min_confidence = 1.5;
        assert!(matches!(config.validate(), Err(SchwaerzError::Config(_))));

        let mut config = PipelineConfig::default();
        config.classifier.consonant_run = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.pii.patterns.push(PatternConfig::new(PiiKind::Date, ""));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_uncompilable_pattern() {
        let mut config = PipelineConfig::default();
        config.pii.patterns.push(PatternConfig::new(PiiKind::Email, r"[a-z+@"));
        match config.validate() {
            Err(SchwaerzError::Pattern(message)) => assert!(message.starts_with("EMAIL pattern")),
            other => panic!("expected a pattern error, got {other:?}"),
        }
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn load_rejects_uncompilable_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schwaerz.json");
        std::fs::write(&path, r#"{ "pii": { "patterns": [{ "kind": "PHONE", "pattern": "(\d" }] } }"#)
            .unwrap();
        assert!(matches!(PipelineConfig::load(&path), Err(SchwaerzError::Pattern(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schwaerz.json");

        let mut config = PipelineConfig::default();
        config.pii.entity_labels = vec![PiiKind::Person];
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = PipelineConfig::load("/nonexistent/schwaerz.json").unwrap_err();
        assert!(matches!(err, SchwaerzError::Io(_)));
    }
}
