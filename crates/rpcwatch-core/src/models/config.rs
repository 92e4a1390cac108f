//! Console configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:9002";
pub const DEFAULT_METHOD: &str = "getWeldDetectMethods";

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    pub version: String,
    /// WebSocket endpoint, `ws://` or `wss://`.
    pub endpoint: String,
    /// Method sent by the console's quick-send key.
    pub default_method: String,
    pub log_level: String,
}

impl ConsoleConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.endpoint)?;

        if self.default_method.trim().is_empty() {
            return Err(Error::Validation(
                "Default method cannot be empty".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_method: DEFAULT_METHOD.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Check that `endpoint` parses as a `ws`/`wss` URL with a host.
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    let invalid = |reason: String| Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let url = url::Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected ws or wss",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(())
}
