// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end batch runs over a temporary input folder, with detections
// replayed from JSON sidecars.

use std::path::Path;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use schwaerz_core::error::Result;
use schwaerz_core::{Detection, PipelineConfig, Stage};
use schwaerz_document::{ScanPage, SidecarRecognizer, TextRecognizer};
use schwaerz_pipeline::{OutputLayout, Pipeline, discover_inputs, run_batch};

const FORM_DETECTIONS: &str = r#"[
    {"region": [[5,5],[45,5],[45,15],[5,15]], "text": "Hello", "confidence": 0.9},
    {"region": [[5,25],[30,25],[30,35],[5,35]], "text": "call", "confidence": 0.9},
    {"region": [[60,25],[115,25],[115,35],[60,35]], "text": "9876543210", "confidence": 0.9},
    {"region": [[5,45],[40,45],[40,55],[5,55]], "text": "xqzkklp", "confidence": 0.8}
]"#;

fn write_scan(dir: &Path, name: &str, detections: &str) {
    RgbImage::from_pixel(120, 60, Rgb([255, 255, 255]))
        .save(dir.join(name))
        .unwrap();
    std::fs::write(dir.join(format!("{name}.detections.json")), detections).unwrap();
}

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default(), Arc::new(SidecarRecognizer::default())).unwrap()
}

#[test]
fn one_unreadable_image_does_not_affect_the_rest() {
    let inputs = tempfile::tempdir().unwrap();
    let outputs = tempfile::tempdir().unwrap();
    write_scan(inputs.path(), "a_form.png", FORM_DETECTIONS);
    write_scan(inputs.path(), "c_blank.png", "[]");
    std::fs::write(inputs.path().join("b_corrupt.png"), b"\x89PNG truncated").unwrap();

    let files = discover_inputs(inputs.path()).unwrap();
    assert_eq!(files.len(), 3);

    let layout = OutputLayout::new(outputs.path());
    let summary = run_batch(&pipeline(), &files, &layout);

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.failures.len(), 1);
    assert!(!summary.all_failed());

    let failure = &summary.failures[0];
    assert_eq!(failure.document.as_str(), "b_corrupt.png");
    assert_eq!(failure.stage, Some(Stage::Load));

    // Successful documents still wrote every output.
    for name in ["a_form.png", "c_blank.png"] {
        assert!(outputs.path().join(format!("extracted_{name}_CLEANED.txt")).is_file());
        assert!(outputs.path().join(format!("extracted_{name}.json")).is_file());
        assert!(outputs.path().join(format!("redacted_{name}")).is_file());
        assert!(!outputs.path().join(format!("debug_clean_{name}")).exists());
    }
    assert!(!outputs.path().join("redacted_b_corrupt.png").exists());
}

/// Replays sidecars, except that it panics on one named file.
struct PanicsOn {
    file: &'static str,
    inner: SidecarRecognizer,
}

impl TextRecognizer for PanicsOn {
    fn name(&self) -> &str {
        "panics-on"
    }

    fn recognize(&self, page: ScanPage<'_>) -> Result<Vec<Detection>> {
        if page.source.file_name().is_some_and(|name| name == self.file) {
            panic!("recognizer blew up on {}", self.file);
        }
        self.inner.recognize(page)
    }
}

#[test]
fn panicking_recognizer_fails_only_its_document() {
    let inputs = tempfile::tempdir().unwrap();
    let outputs = tempfile::tempdir().unwrap();
    for name in ["a.png", "b.png", "c.png"] {
        write_scan(inputs.path(), name, FORM_DETECTIONS);
    }

    let recognizer = PanicsOn {
        file: "b.png",
        inner: SidecarRecognizer::default(),
    };
    let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(recognizer)).unwrap();
    let files = discover_inputs(inputs.path()).unwrap();
    let summary = run_batch(&pipeline, &files, &OutputLayout::new(outputs.path()));

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.failures.len(), 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.document.as_str(), "b.png");
    assert_eq!(failure.stage, None);
    assert_eq!(failure.cause, "panicked: recognizer blew up on b.png");

    assert!(outputs.path().join("redacted_a.png").is_file());
    assert!(outputs.path().join("redacted_c.png").is_file());
    assert!(!outputs.path().join("redacted_b.png").exists());
}

#[test]
fn form_is_reported_and_redacted() {
    let inputs = tempfile::tempdir().unwrap();
    let outputs = tempfile::tempdir().unwrap();
    write_scan(inputs.path(), "form.png", FORM_DETECTIONS);

    let files = discover_inputs(inputs.path()).unwrap();
    let layout = OutputLayout::new(outputs.path()).with_debug(true);
    let summary = run_batch(&pipeline(), &files, &layout);
    assert!(summary.failures.is_empty());

    let report = &summary.reports[0];
    assert_eq!(report.transcript, "Hello call 9876543210");
    assert_eq!(report.classification.rejected, 1);
    assert_eq!(report.redacted_regions, 1);

    let text = std::fs::read_to_string(outputs.path().join("extracted_form.png_CLEANED.txt")).unwrap();
    assert!(text.contains("PHONE: 9876543210"));
    assert!(text.contains("'xqzkklp' (confidence: 0.80) - Reason: Too many consonants"));

    let redacted = image::open(outputs.path().join("redacted_form.png")).unwrap().to_rgb8();
    assert_eq!(redacted.dimensions(), (120, 60));
    assert_eq!(redacted.get_pixel(80, 30).0, [0, 0, 0]);
    assert_eq!(redacted.get_pixel(20, 10).0, [255, 255, 255]);

    assert!(outputs.path().join("debug_clean_form.png").is_file());
}

#[test]
fn missing_sidecar_fails_at_recognition_only() {
    let inputs = tempfile::tempdir().unwrap();
    let outputs = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]))
        .save(inputs.path().join("lonely.jpg"))
        .unwrap();

    let files = discover_inputs(inputs.path()).unwrap();
    let summary = run_batch(&pipeline(), &files, &OutputLayout::new(outputs.path()));
    assert!(summary.all_failed());
    assert_eq!(summary.failures[0].stage, Some(Stage::Recognize));
}

#[test]
fn empty_folder_is_not_a_failure() {
    let inputs = tempfile::tempdir().unwrap();
    let outputs = tempfile::tempdir().unwrap();
    let files = discover_inputs(inputs.path()).unwrap();
    let summary = run_batch(&pipeline(), &files, &OutputLayout::new(outputs.path()));
    assert_eq!(summary.total(), 0);
    assert!(!summary.all_failed());
}
