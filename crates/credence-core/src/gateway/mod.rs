//! Model gateway: the opaque vision/language inference collaborator.
//!
//! Each pipeline stage wraps exactly one [`ModelGateway::invoke`] call. The
//! gateway returns raw JSON; stages own validation of the shape (the JSON is
//! never trusted past the stage boundary).

pub mod error;
pub mod http;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::GatewayError;
pub use http::{HttpGatewayConfig, HttpModelGateway};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockModelGateway;

use async_trait::async_trait;

/// One inference request: an instruction plus optional image and text payloads.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    /// Raw image bytes to attach (sent as a base64 `data:` URL).
    pub image: Option<Vec<u8>>,
    /// Text payload appended to the instruction.
    pub text: Option<String>,
    /// The task instruction for the model.
    pub instruction: String,
}

impl ModelRequest {
    /// Creates a request carrying only an instruction.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Self::default()
        }
    }

    /// Attaches image bytes.
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// Attaches a text payload.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Opaque vision/language inference service.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Runs one inference call and returns the model's JSON output.
    async fn invoke(&self, request: ModelRequest) -> Result<serde_json::Value, GatewayError>;
}
