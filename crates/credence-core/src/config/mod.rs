//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `CREDENCE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{DEFAULT_MAX_ATTEMPTS, REPORT_CONTAINER, SCREENSHOT_CONTAINER};

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `CREDENCE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Root directory of the local object store. Default: `./.data`.
    pub storage_path: PathBuf,

    /// Container (directory) holding uploaded screenshots.
    pub screenshot_container: String,

    /// Container (directory) holding persisted analysis reports.
    pub report_container: String,

    /// OpenAI-compatible chat-completions endpoint for the vision model.
    /// When unset the gateway runs in mock mode.
    pub gateway_url: Option<String>,

    /// Bearer token for the gateway endpoint.
    pub gateway_api_key: Option<String>,

    /// Model / deployment name sent with each gateway request.
    pub gateway_model: String,

    /// Per-request gateway timeout in seconds. Default: `60`.
    pub gateway_timeout_secs: u64,

    /// Attempts per retryable external call. Default: `3`.
    pub max_attempts: u32,
}

/// Default model name used when `CREDENCE_GATEWAY_MODEL` is not set.
pub const DEFAULT_GATEWAY_MODEL: &str = "gpt-4.1";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data"),
            screenshot_container: SCREENSHOT_CONTAINER.to_string(),
            report_container: REPORT_CONTAINER.to_string(),
            gateway_url: None,
            gateway_api_key: None,
            gateway_model: DEFAULT_GATEWAY_MODEL.to_string(),
            gateway_timeout_secs: 60,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "CREDENCE_PORT";
    const ENV_BIND_ADDR: &'static str = "CREDENCE_BIND_ADDR";
    const ENV_STORAGE_PATH: &'static str = "CREDENCE_STORAGE_PATH";
    const ENV_SCREENSHOT_CONTAINER: &'static str = "CREDENCE_SCREENSHOT_CONTAINER";
    const ENV_REPORT_CONTAINER: &'static str = "CREDENCE_REPORT_CONTAINER";
    const ENV_GATEWAY_URL: &'static str = "CREDENCE_GATEWAY_URL";
    const ENV_GATEWAY_API_KEY: &'static str = "CREDENCE_GATEWAY_API_KEY";
    const ENV_GATEWAY_MODEL: &'static str = "CREDENCE_GATEWAY_MODEL";
    const ENV_GATEWAY_TIMEOUT_SECS: &'static str = "CREDENCE_GATEWAY_TIMEOUT_SECS";
    const ENV_MAX_ATTEMPTS: &'static str = "CREDENCE_MAX_ATTEMPTS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let storage_path = Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path);
        let screenshot_container = Self::parse_string_from_env(
            Self::ENV_SCREENSHOT_CONTAINER,
            defaults.screenshot_container,
        );
        let report_container =
            Self::parse_string_from_env(Self::ENV_REPORT_CONTAINER, defaults.report_container);
        let gateway_url = Self::parse_optional_string_from_env(Self::ENV_GATEWAY_URL);
        let gateway_api_key = Self::parse_optional_string_from_env(Self::ENV_GATEWAY_API_KEY);
        let gateway_model =
            Self::parse_string_from_env(Self::ENV_GATEWAY_MODEL, defaults.gateway_model);
        let gateway_timeout_secs =
            Self::parse_u64_from_env(Self::ENV_GATEWAY_TIMEOUT_SECS, defaults.gateway_timeout_secs);
        let max_attempts = Self::parse_u32_from_env(Self::ENV_MAX_ATTEMPTS, defaults.max_attempts);

        Ok(Self {
            port,
            bind_addr,
            storage_path,
            screenshot_container,
            report_container,
            gateway_url,
            gateway_api_key,
            gateway_model,
            gateway_timeout_secs,
            max_attempts,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        for name in [&self.screenshot_container, &self.report_container] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(ConfigError::InvalidContainerName { name: name.clone() });
            }
        }

        if let Some(url) = &self.gateway_url {
            if url.trim().is_empty() {
                return Err(ConfigError::BlankGatewayUrl);
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_u32_from_env(var_name: &str, default: u32) -> u32 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
