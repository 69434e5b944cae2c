//! Text-credibility stage.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::constants::MIN_TEXT_LEN;
use crate::gateway::{ModelGateway, ModelRequest};

use super::error::StageError;
use super::parse::{optional_string_set, require_score};
use super::types::TextAnalysis;

/// Instruction sent with the credibility call.
pub const TEXT_INSTRUCTION: &str = "Assess the credibility of the following news text as a \
fact-checker would: plausibility of claims, sourcing, neutrality, internal coherence, emotional \
manipulation. Respond ONLY with JSON: {\"score\": <0-100, higher = more credible>, \
\"red_flags\": [\"...\"], \"positive_indicators\": [\"...\"]}";

/// Red flag recorded when the input is too short to analyze.
pub const INSUFFICIENT_TEXT_FLAG: &str = "insufficient text";

/// Scores the extracted text, skipping the model for unusable input.
pub struct TextStage {
    gateway: Arc<dyn ModelGateway>,
}

impl TextStage {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Runs the stage. Text shorter than [`MIN_TEXT_LEN`] (after trimming)
    /// short-circuits to a zero score without a gateway call.
    pub async fn run(&self, text: &str) -> Result<TextAnalysis, StageError> {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_TEXT_LEN {
            debug!(len = trimmed.len(), "text below minimum, skipping model call");
            return Ok(insufficient_text());
        }

        let output = self
            .gateway
            .invoke(ModelRequest::new(TEXT_INSTRUCTION).with_text(trimmed))
            .await?;

        parse_text_analysis(&output)
    }
}

fn insufficient_text() -> TextAnalysis {
    let mut red_flags = BTreeSet::new();
    red_flags.insert(INSUFFICIENT_TEXT_FLAG.to_string());
    TextAnalysis {
        score: 0.0,
        red_flags,
        positive_indicators: BTreeSet::new(),
    }
}

fn parse_text_analysis(output: &serde_json::Value) -> Result<TextAnalysis, StageError> {
    Ok(TextAnalysis {
        score: require_score(output, "score")?,
        red_flags: optional_string_set(output, "red_flags"),
        positive_indicators: optional_string_set(output, "positive_indicators"),
    })
}
