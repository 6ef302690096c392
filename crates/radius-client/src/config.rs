//! Client configuration
//!
//! Loaded from JSON. Timeout and retry count have no defaults and must be
//! present in every configuration.

use crate::correlator::CorrelatorConfig;
use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// RADIUS client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-attempt response timeout in milliseconds
    pub timeout_ms: u64,

    /// Retransmissions before a request fails with a timeout
    pub max_retries: u32,

    /// Maximum number of requests in flight (default: 1024)
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    /// Local address for the UDP socket (default: "0.0.0.0:0")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_max_pending() -> usize {
    1024
}

fn default_bind_address() -> String {
    "0.0.0.0:0".to_string()
}

impl ClientConfig {
    /// Configuration with the given retry policy and defaults elsewhere
    ///
    /// Timeouts beyond `u64::MAX` milliseconds saturate.
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        ClientConfig {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            max_retries,
            max_pending: default_max_pending(),
            bind_address: default_bind_address(),
            log_level: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(contents: &str) -> ClientResult<Self> {
        let config: ClientConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> ClientResult<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed bind address
    pub fn bind_addr(&self) -> ClientResult<SocketAddr> {
        self.bind_address.parse().map_err(|_| {
            ClientError::Configuration(format!("Invalid bind address: {}", self.bind_address))
        })
    }

    /// Retry policy for the correlator
    pub fn correlator_config(&self) -> CorrelatorConfig {
        CorrelatorConfig::new(self.timeout(), self.max_retries).with_max_pending(self.max_pending)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ClientResult<()> {
        if self.timeout_ms == 0 {
            return Err(ClientError::Configuration(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.max_pending == 0 {
            return Err(ClientError::Configuration(
                "max_pending must be greater than 0".to_string(),
            ));
        }

        self.bind_addr()?;

        if let Some(level) = &self.log_level
            && !LOG_LEVELS.contains(&level.to_lowercase().as_str())
        {
            return Err(ClientError::Configuration(format!(
                "Invalid log level: {} (expected one of {})",
                level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
