//! Image-authenticity stage.

use std::sync::Arc;

use tracing::debug;

use crate::gateway::{ModelGateway, ModelRequest};
use crate::storage::ObjectStore;

use super::error::StageError;
use super::parse::{optional_string_set, require_score, require_str};
use super::types::{BoundingBox, ImageAnalysis, ImageAssessment, ImageVerdict, ScreenshotRef};

/// Instruction sent with each authenticity call. Region coordinates are
/// appended per call.
pub const IMAGE_INSTRUCTION: &str = "Judge the authenticity of the imagery in this screenshot: \
AI-generation artifacts, compositing, inconsistent lighting or geometry. Respond ONLY with JSON: \
{\"score\": <0-100, higher = more authentic>, \"verdict\": \"AUTHENTIC\" | \
\"LIKELY_AI_GENERATED\" | \"INCONCLUSIVE\", \"red_flags\": [\"...\"]}";

/// Runs one authenticity check per detected region (whole image if none) and
/// aggregates worst-case.
pub struct ImageStage {
    store: Arc<dyn ObjectStore>,
    gateway: Arc<dyn ModelGateway>,
}

impl ImageStage {
    pub fn new(store: Arc<dyn ObjectStore>, gateway: Arc<dyn ModelGateway>) -> Self {
        Self { store, gateway }
    }

    /// Runs the stage. The aggregate takes the minimum region score: one
    /// fabricated region is not diluted by authentic neighbours.
    pub async fn run(
        &self,
        screenshot: &ScreenshotRef,
        regions: &[BoundingBox],
    ) -> Result<ImageAssessment, StageError> {
        let bytes = self
            .store
            .fetch(&screenshot.container, &screenshot.name)
            .await?;

        let mut analyses = Vec::new();
        if regions.is_empty() {
            // Whole-image fallback: the single check is both the per-region
            // entry and the aggregate.
            let output = self
                .gateway
                .invoke(
                    ModelRequest::new(format!(
                        "{IMAGE_INSTRUCTION}\n\nNo embedded image regions were detected; judge \
                         the screenshot as a whole."
                    ))
                    .with_image(bytes),
                )
                .await?;
            analyses.push(parse_image_analysis(&output)?);
        } else {
            for (index, region) in regions.iter().enumerate() {
                let output = self
                    .gateway
                    .invoke(
                        ModelRequest::new(format!(
                            "{IMAGE_INSTRUCTION}\n\nFocus on the embedded image region at \
                             x={}, y={}, {}x{} pixels (region {} of {}).",
                            region.x,
                            region.y,
                            region.width,
                            region.height,
                            index + 1,
                            regions.len()
                        ))
                        .with_image(bytes.clone()),
                    )
                    .await?;
                analyses.push(parse_image_analysis(&output)?);
            }
        }

        let aggregate = aggregate_analyses(&analyses);
        debug!(
            screenshot = %screenshot,
            regions = analyses.len(),
            aggregate_score = aggregate.score,
            "image authenticity complete"
        );

        Ok(ImageAssessment {
            aggregate,
            regions: analyses,
        })
    }
}

fn parse_image_analysis(output: &serde_json::Value) -> Result<ImageAnalysis, StageError> {
    let verdict = match require_str(output, "verdict")? {
        "AUTHENTIC" => ImageVerdict::Authentic,
        "LIKELY_AI_GENERATED" => ImageVerdict::LikelyAiGenerated,
        "INCONCLUSIVE" => ImageVerdict::Inconclusive,
        other => {
            return Err(StageError::MalformedModelOutput(format!(
                "unknown verdict '{other}'"
            )));
        }
    };

    Ok(ImageAnalysis {
        score: require_score(output, "score")?,
        verdict,
        red_flags: optional_string_set(output, "red_flags"),
    })
}

/// Worst-case aggregation: min score; LIKELY_AI_GENERATED dominates,
/// AUTHENTIC requires unanimity.
fn aggregate_analyses(analyses: &[ImageAnalysis]) -> ImageAnalysis {
    let score = analyses
        .iter()
        .map(|a| a.score)
        .fold(f64::INFINITY, f64::min);

    let verdict = if analyses
        .iter()
        .any(|a| a.verdict == ImageVerdict::LikelyAiGenerated)
    {
        ImageVerdict::LikelyAiGenerated
    } else if analyses.iter().all(|a| a.verdict == ImageVerdict::Authentic) {
        ImageVerdict::Authentic
    } else {
        ImageVerdict::Inconclusive
    };

    let red_flags = analyses
        .iter()
        .flat_map(|a| a.red_flags.iter().cloned())
        .collect();

    ImageAnalysis {
        score,
        verdict,
        red_flags,
    }
}
