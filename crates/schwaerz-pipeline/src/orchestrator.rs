// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestrator — runs one document through every stage.
//
// Stages run strictly in order: load, normalize, recognize, validate,
// classify, assemble, extract, redact. Errors from the fallible stages are
// wrapped with the document id and stage before they leave `process_file`,
// so a batch can report exactly where each failure happened. The recognizer,
// normalizer and entity source are injected and shared read-only.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use image::{DynamicImage, GrayImage};
use schwaerz_core::error::{Result, SchwaerzError};
use schwaerz_core::{
    ClassificationResult, Detection, DocumentId, PipelineConfig, RedactionDecision, Region, Stage,
};
use schwaerz_document::{
    ImageNormalizer, ScanNormalizer, ScanPage, SourceImage, TextRecognizer, paint_redactions,
};
use schwaerz_pii::{EntityRecognizer, Extraction, PiiExtractor, RedactionMatcher};
use schwaerz_text::{ReadabilityClassifier, Transcript, assemble};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::integrity::hash_bytes;
use crate::report::{ClassificationReport, DocumentReport};

/// Text-side outcome for one document's detections.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Every detection with its verdict, in recognition order.
    pub results: Vec<ClassificationResult>,
    /// Accepted detections in reading order and the joined text.
    pub transcript: Transcript,
    pub extraction: Extraction,
    /// One decision per transcript detection, in reading order.
    pub decisions: Vec<RedactionDecision>,
}

impl Analysis {
    /// Regions of the detections that must be painted over.
    pub fn sensitive_regions(&self) -> Vec<Region> {
        self.decisions
            .iter()
            .filter(|d| d.sensitive)
            .map(|d| *d.detection.region())
            .collect()
    }
}

/// A processed document, ready to persist.
pub struct ProcessedDocument {
    pub report: DocumentReport,
    /// Source image with sensitive regions painted black.
    pub redacted: DynamicImage,
    /// The raster recognition ran on.
    pub normalized: GrayImage,
}

/// Per-document pipeline with its collaborators.
pub struct Pipeline {
    config: PipelineConfig,
    run_id: Uuid,
    normalizer: Arc<dyn ImageNormalizer>,
    recognizer: Arc<dyn TextRecognizer>,
    entities: Option<Arc<dyn EntityRecognizer>>,
    classifier: ReadabilityClassifier,
    extractor: PiiExtractor,
    matcher: RedactionMatcher,
}

impl Pipeline {
    /// Validate `config`, compile the PII patterns and use the configured
    /// [`ScanNormalizer`]. No entity source is attached.
    pub fn new(config: PipelineConfig, recognizer: Arc<dyn TextRecognizer>) -> Result<Self> {
        config.validate()?;
        let extractor = PiiExtractor::new(&config.pii)?;
        Ok(Self {
            run_id: Uuid::new_v4(),
            normalizer: Arc::new(ScanNormalizer::new(config.normalize.clone())),
            recognizer,
            entities: None,
            classifier: ReadabilityClassifier::new(config.classifier.clone()),
            extractor,
            matcher: RedactionMatcher::new(config.matcher.clone()),
            config,
        })
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn ImageNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_entities(mut self, entities: Arc<dyn EntityRecognizer>) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Identifier stamped on every report this pipeline produces.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run every stage for the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SchwaerzError::Document`] naming the failing stage when the
    /// image cannot be read or decoded, normalization or recognition fails,
    /// or a detection fails validation.
    #[instrument(skip_all, fields(document = %document_id(path)))]
    pub fn process_file(&self, path: &Path) -> Result<ProcessedDocument> {
        let document = document_id(path);
        let at = |stage: Stage| {
            let document = document.clone();
            move |err: SchwaerzError| err.in_document(&document, stage)
        };

        let bytes = std::fs::read(path)
            .map_err(SchwaerzError::from)
            .map_err(at(Stage::Load))?;
        let source_sha256 = hash_bytes(&bytes);
        let image = SourceImage::decode(&bytes).map_err(at(Stage::Load))?;
        let (width, height) = image.dimensions();
        debug!(width, height, "image loaded");

        let normalized = self
            .normalizer
            .normalize(image.as_dynamic())
            .map_err(at(Stage::Normalize))?;

        let detections = self
            .recognizer
            .recognize(ScanPage {
                source: path,
                raster: &normalized,
            })
            .map_err(at(Stage::Recognize))?;
        info!(
            detections = detections.len(),
            recognizer = self.recognizer.name(),
            "text recognized"
        );

        validate_detections(&detections).map_err(at(Stage::Validate))?;
        let raw_chars = detections.iter().map(|d| d.text().chars().count()).sum();

        let analysis = self.analyze(detections);
        let regions = analysis.sensitive_regions();
        let mut redacted = image.into_dynamic();
        paint_redactions(&mut redacted, &regions);

        let report = self.build_report(path, document, source_sha256, raw_chars, analysis, regions.len());
        info!(
            accepted = report.classification.accepted,
            rejected = report.classification.rejected,
            pii = report.pii.len(),
            redacted = report.redacted_regions,
            "document processed"
        );
        Ok(ProcessedDocument {
            report,
            redacted,
            normalized,
        })
    }

    /// Classify, assemble, extract and match. Total: never fails, and an
    /// empty detection list gives an empty transcript with nothing to redact.
    pub fn analyze(&self, detections: Vec<Detection>) -> Analysis {
        let results = self.classifier.classify_all(detections);
        let accepted = results
            .iter()
            .filter(|r| r.accepted)
            .map(|r| r.detection.clone())
            .collect();
        let transcript = assemble(accepted);
        let extraction = self
            .extractor
            .extract(transcript.text(), self.entities.as_deref());
        let decisions = self
            .matcher
            .decide(transcript.detections(), &extraction.matches);
        Analysis {
            results,
            transcript,
            extraction,
            decisions,
        }
    }

    fn build_report(
        &self,
        path: &Path,
        document: DocumentId,
        source_sha256: String,
        raw_chars: usize,
        analysis: Analysis,
        redacted_regions: usize,
    ) -> DocumentReport {
        let classification = ClassificationReport::from_results(
            &analysis.results,
            self.config.report.rejected_sample_limit,
        );
        let (_, transcript) = analysis.transcript.into_parts();
        DocumentReport {
            run_id: self.run_id,
            document,
            source: path.to_path_buf(),
            source_sha256,
            processed_at: Utc::now(),
            recognizer: self.recognizer.name().to_owned(),
            classification,
            raw_chars,
            transcript_chars: transcript.chars().count(),
            transcript_words: transcript.split_whitespace().count(),
            transcript,
            pii: analysis.extraction.matches,
            entity_status: analysis.extraction.entity_status,
            redacted_regions,
        }
    }
}

/// Document identifier for a source path: its file name, or the whole path
/// when it has none.
pub fn document_id(path: &Path) -> DocumentId {
    match path.file_name() {
        Some(name) => DocumentId::new(name.to_string_lossy()),
        None => DocumentId::new(path.display().to_string()),
    }
}

/// Reject detections a recognizer should never have produced: confidence
/// outside `[0, 1]` or non-finite corner coordinates.
fn validate_detections(detections: &[Detection]) -> Result<()> {
    for (index, detection) in detections.iter().enumerate() {
        let confidence = detection.confidence();
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SchwaerzError::InvalidInput(format!(
                "detection {index} has confidence {confidence} outside [0, 1]"
            )));
        }
        let finite = detection
            .region()
            .corners()
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite());
        if !finite {
            return Err(SchwaerzError::InvalidInput(format!(
                "detection {index} ({:?}) has a non-finite corner",
                detection.text()
            )));
        }
    }
    Ok(())
}
