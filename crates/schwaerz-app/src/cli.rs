// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface and collaborator wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use schwaerz_core::PipelineConfig;
use schwaerz_core::error::{Result, SchwaerzError};
use schwaerz_document::{SidecarRecognizer, TextRecognizer};
use schwaerz_pii::{EntityRecognizer, GazetteerRecognizer, UnavailableRecognizer};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "schwaerz")]
#[command(version, about = "Redact PII from scanned documents", long_about = None)]
pub struct Cli {
    /// Folder with the .jpg/.jpeg/.png scans to process
    #[arg(short, long, env = "SCHWAERZ_INPUT", default_value = "inputs")]
    pub input: PathBuf,

    /// Folder for reports and redacted images (created if missing)
    #[arg(short, long, env = "SCHWAERZ_OUTPUT", default_value = "outputs")]
    pub output: PathBuf,

    /// Pipeline configuration file (JSON); defaults apply when it does not exist
    #[arg(short, long, env = "SCHWAERZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Entity dictionary (JSON: {"PERSON": [...], "ORG": [...], "GPE": [...]})
    #[arg(long)]
    pub gazetteer: Option<PathBuf>,

    /// Where detections come from
    #[arg(long, value_enum, default_value_t = RecognizerKind::Sidecar)]
    pub recognizer: RecognizerKind,

    /// Directory with text-detection.rten and text-recognition.rten
    #[arg(long)]
    pub ocr_models: Option<PathBuf>,

    /// Also write the normalized raster as debug_clean_<file>
    #[arg(long)]
    pub save_debug: bool,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Write the default configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    pub write_default_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecognizerKind {
    /// Replay `<image>.detections.json` files
    Sidecar,
    /// Run the ocrs engine (needs the `ocr` feature)
    Ocrs,
}

/// Read the configuration, falling back to defaults when no file is given
/// or the given file does not exist.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) if path.exists() => {
            let config = PipelineConfig::load(path)?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        Some(path) => {
            warn!(path = %path.display(), "configuration file not found; using defaults");
            Ok(PipelineConfig::default())
        }
        None => Ok(PipelineConfig::default()),
    }
}

pub fn build_recognizer(cli: &Cli) -> Result<Arc<dyn TextRecognizer>> {
    match cli.recognizer {
        RecognizerKind::Sidecar => Ok(Arc::new(SidecarRecognizer::default())),
        RecognizerKind::Ocrs => build_ocrs(cli.ocr_models.as_deref()),
    }
}

#[cfg(feature = "ocr")]
fn build_ocrs(models: Option<&Path>) -> Result<Arc<dyn TextRecognizer>> {
    use schwaerz_document::scan::ocr::{OcrConfig, OcrEngine};

    let config = models.map(OcrConfig::from_dir).unwrap_or_default();
    Ok(Arc::new(OcrEngine::new(config)?))
}

#[cfg(not(feature = "ocr"))]
fn build_ocrs(_models: Option<&Path>) -> Result<Arc<dyn TextRecognizer>> {
    Err(SchwaerzError::OcrError(
        "this build has no OCR engine; rebuild with `--features ocr` or use `--recognizer sidecar`"
            .into(),
    ))
}

/// Load the gazetteer if one was given. A gazetteer that fails to load
/// leaves the run pattern-only, and each report carries the load error.
pub fn load_entities(path: Option<&Path>) -> Option<Arc<dyn EntityRecognizer>> {
    let path = path?;
    match GazetteerRecognizer::load(path) {
        Ok(gazetteer) => Some(Arc::new(gazetteer)),
        Err(err) => {
            warn!(error = %err, "entity dictionary unavailable; continuing with patterns only");
            let reason = format!("entity dictionary {} failed to load: {err}", path.display());
            Some(Arc::new(UnavailableRecognizer::new("gazetteer", reason)))
        }
    }
}

/// Create the missing input folder so the user knows where to put scans.
pub fn ensure_input_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|err| {
            SchwaerzError::InvalidInput(format!(
                "input folder {} is missing and could not be created: {err}",
                dir.display()
            ))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["schwaerz"]);
        assert_eq!(cli.input, PathBuf::from("inputs"));
        assert_eq!(cli.output, PathBuf::from("outputs"));
        assert_eq!(cli.recognizer, RecognizerKind::Sidecar);
        assert!(!cli.save_debug);
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "schwaerz",
            "-i",
            "scans",
            "--recognizer",
            "ocrs",
            "--save-debug",
            "-j",
            "4",
        ]);
        assert_eq!(cli.input, PathBuf::from("scans"));
        assert_eq!(cli.recognizer, RecognizerKind::Ocrs);
        assert!(cli.save_debug);
        assert_eq!(cli.threads, Some(4));
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let config = load_config(Some(Path::new("/nonexistent/schwaerz.json"))).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schwaerz.json");
        std::fs::write(&path, r#"{ "classifier": { "min_confidence": 0.5 } }"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.classifier.min_confidence, 0.5);
        assert_eq!(config.matcher, PipelineConfig::default().matcher);
    }

    #[test]
    fn broken_gazetteer_degrades_with_its_cause() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");
        std::fs::write(&path, "{ not json").unwrap();

        let entities = load_entities(Some(&path)).unwrap();
        assert!(!entities.is_available());
        let reason = entities.unavailable_reason().unwrap();
        assert!(reason.contains("failed to load"), "{reason}");
        assert!(reason.contains("entities.json"), "{reason}");

        let missing = load_entities(Some(Path::new("/nonexistent/entities.json"))).unwrap();
        assert!(missing.unavailable_reason().unwrap().contains("/nonexistent/entities.json"));
        assert!(load_entities(None).is_none());
    }

    #[test]
    fn input_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = dir.path().join("inputs");
        ensure_input_dir(&inputs).unwrap();
        assert!(inputs.is_dir());
    }
}
