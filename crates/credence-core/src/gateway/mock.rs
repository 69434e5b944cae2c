//! Scripted gateway mock for tests.

use parking_lot::RwLock;
use std::collections::VecDeque;

use async_trait::async_trait;

use super::error::GatewayError;
use super::{ModelGateway, ModelRequest};

struct Rule {
    marker: String,
    // One-shot results consumed first, then `fallback` forever.
    queue: VecDeque<Result<serde_json::Value, GatewayError>>,
    fallback: Option<Result<serde_json::Value, GatewayError>>,
}

/// [`ModelGateway`] returning scripted responses keyed by instruction substring.
///
/// Rules are matched in registration order; the first rule whose marker occurs
/// in the request instruction wins. Unmatched requests fail as unavailable, so
/// a stage that should never call the gateway is caught by its absence here.
#[derive(Default)]
pub struct MockModelGateway {
    rules: RwLock<Vec<Rule>>,
    calls: RwLock<Vec<ModelRequest>>,
}

impl MockModelGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answers instructions containing `marker` with `response`.
    pub fn respond(self, marker: &str, response: serde_json::Value) -> Self {
        self.add_rule(marker, VecDeque::new(), Some(Ok(response)));
        self
    }

    /// Always fails instructions containing `marker` with `error`.
    pub fn fail(self, marker: &str, error: GatewayError) -> Self {
        self.add_rule(marker, VecDeque::new(), Some(Err(error)));
        self
    }

    /// Fails the first `times` matching calls, then answers with `response`.
    pub fn fail_then_respond(
        self,
        marker: &str,
        error: GatewayError,
        times: usize,
        response: serde_json::Value,
    ) -> Self {
        let queue = (0..times).map(|_| Err(error.clone())).collect();
        self.add_rule(marker, queue, Some(Ok(response)));
        self
    }

    fn add_rule(
        &self,
        marker: &str,
        queue: VecDeque<Result<serde_json::Value, GatewayError>>,
        fallback: Option<Result<serde_json::Value, GatewayError>>,
    ) {
        self.rules.write().push(Rule {
            marker: marker.to_string(),
            queue,
            fallback,
        });
    }

    /// Number of calls whose instruction contained `marker`.
    pub fn call_count(&self, marker: &str) -> usize {
        self.calls
            .read()
            .iter()
            .filter(|c| c.instruction.contains(marker))
            .count()
    }

    /// Total number of calls received.
    pub fn total_calls(&self) -> usize {
        self.calls.read().len()
    }

    /// Instructions of all recorded calls, in arrival order.
    pub fn recorded_instructions(&self) -> Vec<String> {
        self.calls.read().iter().map(|c| c.instruction.clone()).collect()
    }
}

#[async_trait]
impl ModelGateway for MockModelGateway {
    async fn invoke(&self, request: ModelRequest) -> Result<serde_json::Value, GatewayError> {
        self.calls.write().push(request.clone());

        let mut rules = self.rules.write();
        let rule = rules
            .iter_mut()
            .find(|r| request.instruction.contains(&r.marker));

        match rule {
            Some(rule) => match rule.queue.pop_front() {
                Some(result) => result,
                None => rule.fallback.clone().unwrap_or_else(|| {
                    Err(GatewayError::Unavailable(format!(
                        "no scripted response left for '{}'",
                        rule.marker
                    )))
                }),
            },
            None => Err(GatewayError::Unavailable(format!(
                "no scripted response for instruction: {}",
                request.instruction
            ))),
        }
    }
}
