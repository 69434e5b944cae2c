//! Offline gateway stub.
//!
//! Used when no `CREDENCE_GATEWAY_URL` is configured, so the service can run
//! end-to-end without an inference provider. Responses are canned, neutral,
//! and shaped to each stage's schema.

use async_trait::async_trait;
use serde_json::json;

use credence::analysis::{
    CONSISTENCY_INSTRUCTION, IMAGE_INSTRUCTION, OCR_INSTRUCTION, TEXT_INSTRUCTION,
};
use credence::{GatewayError, ModelGateway, ModelRequest};

/// [`ModelGateway`] that answers every stage with a neutral canned response.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubModelGateway;

impl StubModelGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelGateway for StubModelGateway {
    async fn invoke(&self, request: ModelRequest) -> Result<serde_json::Value, GatewayError> {
        let instruction = request.instruction.as_str();

        if instruction.starts_with(OCR_INSTRUCTION) {
            return Ok(json!({ "text": "", "image_regions": [] }));
        }
        if instruction.starts_with(TEXT_INSTRUCTION) {
            return Ok(json!({
                "score": 50,
                "red_flags": ["stub gateway: no model configured"],
                "positive_indicators": []
            }));
        }
        if instruction.starts_with(IMAGE_INSTRUCTION) {
            return Ok(json!({
                "score": 50,
                "verdict": "INCONCLUSIVE",
                "red_flags": ["stub gateway: no model configured"]
            }));
        }
        if instruction.starts_with(CONSISTENCY_INSTRUCTION) {
            return Ok(json!({ "score": 50, "mismatches": [] }));
        }

        Err(GatewayError::Unavailable(
            "stub gateway received an unknown instruction".to_string(),
        ))
    }
}
