//! Controller and timeout configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Controller name (defaults to hostname).
    pub name: Option<String>,

    /// Root of the controller's durable state.
    pub data_dir: PathBuf,

    /// Endpoint agents ship collected logs to.
    pub report_endpoint: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            name: None,
            data_dir: PathBuf::from("/var/lib/loghub"),
            report_endpoint: String::new(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long to wait for an agent to acknowledge a start command. This
    /// alone bounds a start command.
    pub ack_seconds: u64,

    /// Connect timeout and config push timeout for agents, in seconds.
    pub http_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            ack_seconds: 30,
            http_seconds: 10,
        }
    }
}

impl TimeoutConfig {
    /// Acknowledgment wait as a duration.
    pub fn ack(&self) -> Duration {
        Duration::from_secs(self.ack_seconds)
    }

    /// HTTP request timeout as a duration.
    pub fn http(&self) -> Duration {
        Duration::from_secs(self.http_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_config_default() {
        let config = ControllerConfig::default();
        assert!(config.name.is_none());
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/loghub"));
        assert!(config.report_endpoint.is_empty());
    }

    #[test]
    fn test_timeout_config_default() {
        let config = TimeoutConfig::default();
        assert_eq!(config.ack(), Duration::from_secs(30));
        assert_eq!(config.http(), Duration::from_secs(10));
    }
}
