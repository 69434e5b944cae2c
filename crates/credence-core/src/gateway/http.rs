//! OpenAI-compatible HTTP gateway implementation.
//!
//! Speaks the `/chat/completions` protocol: the instruction (plus any text
//! payload) goes in as user content, images ride along as base64 `data:`
//! URLs, and the first choice's message content is parsed back into JSON.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, error};

use super::error::GatewayError;
use super::{ModelGateway, ModelRequest};

/// Connection settings for [`HttpModelGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Full chat-completions endpoint URL.
    pub url: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Model / deployment name.
    pub model: String,
    /// Per-request deadline.
    pub timeout: Duration,
}

/// [`ModelGateway`] over an OpenAI-compatible chat-completions endpoint.
pub struct HttpModelGateway {
    config: HttpGatewayConfig,
    http: reqwest::Client,
}

impl HttpModelGateway {
    /// Creates a gateway; fails only if the HTTP client cannot be built.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("failed to build client: {e}")))?;

        Ok(Self { config, http })
    }

    fn build_payload(&self, request: &ModelRequest) -> serde_json::Value {
        let mut user_text = request.instruction.clone();
        if let Some(text) = &request.text {
            user_text.push_str("\n\nTEXT:\n");
            user_text.push_str(text);
        }

        let mut content = vec![serde_json::json!({ "type": "text", "text": user_text })];
        if let Some(image) = &request.image {
            let encoded = BASE64.encode(image);
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:image/jpeg;base64,{encoded}"),
                    "detail": "high"
                }
            }));
        }

        serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": content }],
            "temperature": 0.0,
        })
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    async fn invoke(&self, request: ModelRequest) -> Result<serde_json::Value, GatewayError> {
        let payload = self.build_payload(&request);

        let mut http_request = self.http.post(&self.config.url).json(&payload);
        if let Some(key) = &self.config.api_key {
            http_request = http_request.bearer_auth(key);
        }

        debug!(
            model = %self.config.model,
            has_image = request.image.is_some(),
            "invoking model gateway"
        );

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    seconds: self.config.timeout.as_secs(),
                }
            } else {
                GatewayError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "gateway returned error status");
            return Err(GatewayError::Unavailable(format!(
                "gateway returned HTTP {status}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                GatewayError::MalformedResponse("response has no message content".to_string())
            })?;

        parse_model_json(content)
    }
}

/// Parses the model's text content as JSON, tolerating ```json fences.
pub(crate) fn parse_model_json(content: &str) -> Result<serde_json::Value, GatewayError> {
    let trimmed = content.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_start_matches(['\r', '\n']))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    serde_json::from_str(stripped)
        .map_err(|e| GatewayError::MalformedResponse(format!("content is not JSON: {e}")))
}
