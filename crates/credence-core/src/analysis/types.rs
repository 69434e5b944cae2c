use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifies a source screenshot in the object store. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotRef {
    /// Object name, e.g. `"a.jpg"`.
    pub name: String,
    /// Container the object lives in.
    pub container: String,
}

impl ScreenshotRef {
    pub fn new(name: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container: container.into(),
        }
    }
}

impl std::fmt::Display for ScreenshotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
    }
}

/// A detected embedded-image area, in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Output of the extraction stage. Region order is detection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// All extracted text. May be empty; that is a valid low-information signal.
    pub text: String,
    /// Detected embedded-image regions.
    pub image_regions: Vec<BoundingBox>,
    /// Model descriptions of each region, aligned with `image_regions`.
    pub region_notes: Vec<String>,
}

impl ExtractionResult {
    /// Returns `true` if no usable text was extracted.
    pub fn has_empty_text(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Credibility assessment of the extracted text alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    /// Credibility estimate, 0 (fabricated) to 100 (credible).
    pub score: f64,
    pub red_flags: BTreeSet<String>,
    pub positive_indicators: BTreeSet<String>,
}

/// Authenticity verdict for one image region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageVerdict {
    #[serde(rename = "AUTHENTIC")]
    Authentic,
    #[serde(rename = "LIKELY_AI_GENERATED")]
    LikelyAiGenerated,
    #[serde(rename = "INCONCLUSIVE")]
    Inconclusive,
}

/// Authenticity assessment of one region (or the whole screenshot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Authenticity estimate, 0 (generated) to 100 (authentic).
    pub score: f64,
    pub verdict: ImageVerdict,
    pub red_flags: BTreeSet<String>,
}

/// Per-region analyses plus the worst-case aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAssessment {
    /// Aggregate over all regions; the minimum region score dominates.
    pub aggregate: ImageAnalysis,
    /// One entry per detected region, in detection order. Holds the single
    /// whole-image analysis when no regions were detected.
    pub regions: Vec<ImageAnalysis>,
}

/// Agreement between textual claims and visual evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyAnalysis {
    /// Consistency estimate, 0 (contradictory) to 100 (consistent).
    pub score: f64,
    /// Mismatches in the order the model reported them.
    pub mismatches: Vec<String>,
}

impl ConsistencyAnalysis {
    /// The neutral result used when there is no text to check against.
    pub fn neutral() -> Self {
        Self {
            score: 100.0,
            mismatches: Vec::new(),
        }
    }
}
