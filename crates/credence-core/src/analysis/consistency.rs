//! Text-image consistency stage.

use std::sync::Arc;

use tracing::debug;

use crate::gateway::{ModelGateway, ModelRequest};

use super::error::StageError;
use super::parse::{optional_string_list, require_score};
use super::types::{ConsistencyAnalysis, ImageAnalysis};

/// Instruction sent with the consistency call.
pub const CONSISTENCY_INSTRUCTION: &str = "Check the consistency between the textual claims \
below and the visual evidence: entity-object alignment, action-event alignment, and direct \
contradictions. Respond ONLY with JSON: {\"score\": <0-100, higher = more consistent>, \
\"mismatches\": [\"each specific mismatch found\"]}";

/// Compares textual claims against the image-stage findings.
pub struct ConsistencyStage {
    gateway: Arc<dyn ModelGateway>,
}

impl ConsistencyStage {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Runs the stage. Consistency is undefined without text, so empty text
    /// yields the neutral result (score 100, no mismatches) with no gateway
    /// call; image-only posts are not penalized.
    pub async fn run(
        &self,
        text: &str,
        image_aggregate: &ImageAnalysis,
        region_notes: &[String],
    ) -> Result<ConsistencyAnalysis, StageError> {
        if text.trim().is_empty() {
            debug!("no extracted text, consistency is neutral");
            return Ok(ConsistencyAnalysis::neutral());
        }

        let mut payload = format!("CLAIMED TEXT:\n{}\n", text.trim());
        payload.push_str(&format!(
            "\nIMAGE AUTHENTICITY: score {:.1}, verdict {:?}\n",
            image_aggregate.score, image_aggregate.verdict
        ));
        if !region_notes.is_empty() {
            payload.push_str("\nDETECTED IMAGE REGIONS:\n");
            for note in region_notes.iter().filter(|n| !n.is_empty()) {
                payload.push_str("- ");
                payload.push_str(note);
                payload.push('\n');
            }
        }

        let output = self
            .gateway
            .invoke(ModelRequest::new(CONSISTENCY_INSTRUCTION).with_text(payload))
            .await?;

        Ok(ConsistencyAnalysis {
            score: require_score(&output, "score")?,
            mismatches: optional_string_list(&output, "mismatches"),
        })
    }
}
