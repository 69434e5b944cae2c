use std::path::PathBuf;
use std::sync::Arc;

use credence::{ObjectStore, Orchestrator};

/// Gateway operating mode, reported by `/ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    /// Calls a real inference endpoint.
    Live,
    /// Canned offline responses.
    Stub,
}

impl GatewayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayMode::Live => "live",
            GatewayMode::Stub => "stub",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,

    pub store: Arc<dyn ObjectStore>,

    pub screenshot_container: String,

    pub report_container: String,

    pub storage_path: PathBuf,

    pub gateway_mode: GatewayMode,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: Arc<dyn ObjectStore>,
        screenshot_container: impl Into<String>,
        report_container: impl Into<String>,
        storage_path: PathBuf,
        gateway_mode: GatewayMode,
    ) -> Self {
        Self {
            orchestrator,
            store,
            screenshot_container: screenshot_container.into(),
            report_container: report_container.into(),
            storage_path,
            gateway_mode,
        }
    }
}
