// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Schwärz redaction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::SchwaerzError;

/// Identifier of one document in a batch (normally the source file name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pipeline stages, in execution order. Used to attribute per-document failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Normalize,
    Recognize,
    Validate,
    Classify,
    Assemble,
    Extract,
    Redact,
    Persist,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Normalize => "normalize",
            Self::Recognize => "recognize",
            Self::Validate => "validate",
            Self::Classify => "classify",
            Self::Assemble => "assemble",
            Self::Extract => "extract",
            Self::Redact => "redact",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in image pixel coordinates. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Outline of a detection: exactly four corners in the order top-left,
/// top-right, bottom-right, bottom-left. Serialized as four `[x, y]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region {
    corners: [Point; 4],
}

impl Region {
    /// Build a region from its four corners (top-left, top-right,
    /// bottom-right, bottom-left).
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// An axis-aligned region spanning `(left, top)` to `(right, bottom)`.
    pub fn axis_aligned(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new([
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ])
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }
}

// ---------------------------------------------------------------------------
// Detections
// ---------------------------------------------------------------------------

/// One recognized text region as reported by a recognition engine.
///
/// Immutable once built. Construction validates that the confidence lies in
/// `[0, 1]`; deserialized detections go through the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DetectionRecord")]
pub struct Detection {
    region: Region,
    text: String,
    confidence: f64,
}

/// Unvalidated wire form of a [`Detection`].
#[derive(Deserialize)]
struct DetectionRecord {
    region: Region,
    text: String,
    confidence: f64,
}

impl TryFrom<DetectionRecord> for Detection {
    type Error = SchwaerzError;

    fn try_from(record: DetectionRecord) -> Result<Self, Self::Error> {
        Detection::new(record.region, record.text, record.confidence)
    }
}

impl Detection {
    /// Create a detection, rejecting confidences outside `[0, 1]` (and NaN)
    /// with [`SchwaerzError::InvalidInput`].
    pub fn new(
        region: Region,
        text: impl Into<String>,
        confidence: f64,
    ) -> Result<Self, SchwaerzError> {
        let text = text.into();
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SchwaerzError::InvalidInput(format!(
                "confidence {confidence} for {text:?} is outside [0, 1]"
            )));
        }
        Ok(Self {
            region,
            text,
            confidence,
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Why the readability classifier accepted or rejected a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Ok,
    LowConfidence,
    TooShort,
    TooManySpecialChars,
    TooManyConsonants,
    TooLong,
    WeirdNumberLetterMix,
}

impl Reason {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Ok => "OK",
            Self::LowConfidence => "Low confidence",
            Self::TooShort => "Too short",
            Self::TooManySpecialChars => "Too many special chars",
            Self::TooManyConsonants => "Too many consonants",
            Self::TooLong => "Too long",
            Self::WeirdNumberLetterMix => "Weird number/letter mix",
        };
        f.write_str(text)
    }
}

/// A detection together with the classifier's verdict on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub detection: Detection,
    pub accepted: bool,
    pub reason: Reason,
}

impl ClassificationResult {
    pub fn new(detection: Detection, reason: Reason) -> Self {
        Self {
            detection,
            accepted: reason.is_accepted(),
            reason,
        }
    }
}

// ---------------------------------------------------------------------------
// PII
// ---------------------------------------------------------------------------

/// Kinds of PII the extractor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiKind {
    Phone,
    Email,
    Date,
    Person,
    Org,
    Gpe,
}

impl PiiKind {
    /// Upper-case label, as used in reports and by entity recognizers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Phone => "PHONE",
            Self::Email => "EMAIL",
            Self::Date => "DATE",
            Self::Person => "PERSON",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
        }
    }

    /// Parse an upper-case label. Unknown labels return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "PHONE" => Some(Self::Phone),
            "EMAIL" => Some(Self::Email),
            "DATE" => Some(Self::Date),
            "PERSON" => Some(Self::Person),
            "ORG" => Some(Self::Org),
            "GPE" => Some(Self::Gpe),
            _ => None,
        }
    }
}

impl std::fmt::Display for PiiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A PII value found in the transcript. The value is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PiiMatch {
    kind: PiiKind,
    value: String,
}

impl PiiMatch {
    /// Returns `None` for an empty value.
    pub fn new(kind: PiiKind, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            return None;
        }
        Some(Self { kind, value })
    }

    pub fn kind(&self) -> PiiKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Whether a detection must be painted over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedactionDecision {
    pub detection: Detection,
    pub sensitive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> Region {
        Region::axis_aligned(10.0, 20.0, 110.0, 40.0)
    }

    #[test]
    fn detection_rejects_out_of_range_confidence() {
        assert!(Detection::new(region(), "Hello", 1.2).is_err());
        assert!(Detection::new(region(), "Hello", -0.1).is_err());
        assert!(Detection::new(region(), "Hello", f64::NAN).is_err());
        assert!(Detection::new(region(), "Hello", 0.0).is_ok());
        assert!(Detection::new(region(), "Hello", 1.0).is_ok());
    }

    #[test]
    fn axis_aligned_corner_order() {
        let r = region();
        assert_eq!(r.top_left(), Point::new(10.0, 20.0));
        assert_eq!(r.top_right(), Point::new(110.0, 20.0));
        assert_eq!(r.bottom_right(), Point::new(110.0, 40.0));
        assert_eq!(r.bottom_left(), Point::new(10.0, 40.0));
    }

    #[test]
    fn detection_deserializes_from_corner_pairs() {
        let json = r#"{
            "region": [[1.0, 2.0], [9.0, 2.0], [9.0, 6.0], [1.0, 6.0]],
            "text": "Hello",
            "confidence": 0.8
        }"#;
        let det: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(det.text(), "Hello");
        assert_eq!(det.region().bottom_right(), Point::new(9.0, 6.0));
    }

    #[test]
    fn detection_deserialization_validates_confidence() {
        let json = r#"{
            "region": [[0, 0], [1, 0], [1, 1], [0, 1]],
            "text": "x",
            "confidence": 3.5
        }"#;
        let err = serde_json::from_str::<Detection>(json).unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"));
    }

    #[test]
    fn region_requires_four_corners() {
        let json = "[[0, 0], [1, 0], [1, 1]]";
        assert!(serde_json::from_str::<Region>(json).is_err());
    }

    #[test]
    fn pii_match_never_empty() {
        assert!(PiiMatch::new(PiiKind::Phone, "").is_none());
        let m = PiiMatch::new(PiiKind::Email, "a@b.co").unwrap();
        assert_eq!(m.kind(), PiiKind::Email);
        assert_eq!(m.value(), "a@b.co");
    }

    #[test]
    fn pii_kind_labels() {
        for kind in [
            PiiKind::Phone,
            PiiKind::Email,
            PiiKind::Date,
            PiiKind::Person,
            PiiKind::Org,
            PiiKind::Gpe,
        ] {
            assert_eq!(PiiKind::from_label(kind.label()), Some(kind));
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.label())
            );
        }
        assert_eq!(PiiKind::from_label("DATE_TIME"), None);
    }

    #[test]
    fn classification_result_mirrors_reason() {
        let det = Detection::new(region(), "Hello", 0.8).unwrap();
        assert!(ClassificationResult::new(det.clone(), Reason::Ok).accepted);
        assert!(!ClassificationResult::new(det, Reason::TooLong).accepted);
    }

    #[test]
    fn reason_display_matches_report_wording() {
        assert_eq!(Reason::WeirdNumberLetterMix.to_string(), "Weird number/letter mix");
        assert_eq!(Reason::Ok.to_string(), "OK");
    }
}
