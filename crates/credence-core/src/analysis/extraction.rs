//! OCR + region-detection stage.

use std::sync::Arc;

use tracing::debug;

use crate::constants::MIN_SCREENSHOT_BYTES;
use crate::gateway::{ModelGateway, ModelRequest};
use crate::storage::ObjectStore;

use super::error::StageError;
use super::parse::{require_array, require_pixels, require_str};
use super::types::{BoundingBox, ExtractionResult, ScreenshotRef};

/// Instruction sent with the OCR call. The mock gateway keys on the leading
/// verb phrase, so keep it stable.
pub const OCR_INSTRUCTION: &str = "Extract all readable text from this screenshot and identify \
every embedded image region (photos, graphics, thumbnails; not UI chrome). Respond ONLY with \
JSON: {\"text\": \"<all text, reading order>\", \"image_regions\": [{\"x\": int, \"y\": int, \
\"width\": int, \"height\": int, \"description\": \"what the region shows\"}]}";

/// Fetches the screenshot and runs one OCR + layout inference call.
pub struct ExtractionStage {
    store: Arc<dyn ObjectStore>,
    gateway: Arc<dyn ModelGateway>,
}

impl ExtractionStage {
    pub fn new(store: Arc<dyn ObjectStore>, gateway: Arc<dyn ModelGateway>) -> Self {
        Self { store, gateway }
    }

    /// Runs the stage. Empty extracted text is valid; a screenshot too small
    /// to be an image, or output without the required fields, is not.
    pub async fn run(&self, screenshot: &ScreenshotRef) -> Result<ExtractionResult, StageError> {
        let bytes = self
            .store
            .fetch(&screenshot.container, &screenshot.name)
            .await?;

        if bytes.len() < MIN_SCREENSHOT_BYTES {
            return Err(StageError::InvalidInput(format!(
                "screenshot {screenshot} is {} bytes, below the {MIN_SCREENSHOT_BYTES} byte minimum",
                bytes.len()
            )));
        }

        let output = self
            .gateway
            .invoke(ModelRequest::new(OCR_INSTRUCTION).with_image(bytes))
            .await?;

        let result = parse_extraction(&output)?;
        debug!(
            screenshot = %screenshot,
            text_len = result.text.len(),
            regions = result.image_regions.len(),
            "extraction complete"
        );
        Ok(result)
    }
}

fn parse_extraction(output: &serde_json::Value) -> Result<ExtractionResult, StageError> {
    let text = require_str(output, "text")?.to_string();

    let mut image_regions = Vec::new();
    let mut region_notes = Vec::new();
    for region in require_array(output, "image_regions")? {
        image_regions.push(BoundingBox {
            x: require_pixels(region, "x")?,
            y: require_pixels(region, "y")?,
            width: require_pixels(region, "width")?,
            height: require_pixels(region, "height")?,
        });
        region_notes.push(
            region
                .get("description")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        );
    }

    Ok(ExtractionResult {
        text,
        image_regions,
        region_notes,
    })
}
