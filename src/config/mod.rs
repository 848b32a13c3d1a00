//! Configuration module for loghub.
//!
//! This module provides all configuration types and loading functionality.
//! Configuration is loaded from a YAML file; every section has defaults.

mod agents;
mod controller;
mod logging;
mod server;

pub use agents::AgentEndpoint;
pub use controller::{ControllerConfig, TimeoutConfig};
pub use logging::{LogFormat, LogLevel, LogOutput, LoggingConfig};
pub use server::ServerConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::LoghubError;

/// Default configuration search paths, in order.
const DEFAULT_PATHS: [&str; 4] = [
    "/etc/loghub/config.yaml",
    "/etc/loghub/config.yml",
    "config.yaml",
    "config.yml",
];

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Controller configuration.
    pub controller: ControllerConfig,

    /// Timeout configuration.
    pub timeout: TimeoutConfig,

    /// Collector agents known to the controller.
    pub agents: Vec<AgentEndpoint>,
}

impl Config {
    /// Loads configuration from an optional path.
    /// If path is None, uses default search paths.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, LoghubError> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => {
                for path in &DEFAULT_PATHS {
                    if Path::new(path).exists() {
                        return Self::load_from_path(path);
                    }
                }

                // No config file found, use defaults
                Ok(Self::default())
            }
        }
    }

    /// Loads configuration from a YAML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoghubError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            LoghubError::config_with_source(
                format!("Failed to read config file '{}'", path.as_ref().display()),
                e,
            )
        })?;

        Self::load_from_str(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn load_from_str(content: &str) -> Result<Self, LoghubError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| LoghubError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates configuration.
    pub fn validate(&self) -> Result<(), LoghubError> {
        if self.server.port == 0 {
            return Err(LoghubError::config("server.port must be > 0"));
        }

        if self.controller.data_dir.as_os_str().is_empty() {
            return Err(LoghubError::config("controller.data_dir must not be empty"));
        }

        if self.timeout.ack_seconds == 0 {
            return Err(LoghubError::config("timeout.ack_seconds must be > 0"));
        }
        if self.timeout.http_seconds == 0 {
            return Err(LoghubError::config("timeout.http_seconds must be > 0"));
        }

        let mut seen = HashSet::new();
        for (i, agent) in self.agents.iter().enumerate() {
            if agent.id.is_empty() {
                return Err(LoghubError::config(format!("agents[{}].id is required", i)));
            }
            if agent.address.is_empty() {
                return Err(LoghubError::config(format!(
                    "agents.{}.address is required",
                    agent.id
                )));
            }
            if !seen.insert(agent.id.as_str()) {
                return Err(LoghubError::config(format!(
                    "agents.{} is defined more than once",
                    agent.id
                )));
            }
        }

        if self.logging.output == LogOutput::File && self.logging.file_path.is_none() {
            return Err(LoghubError::config(
                "logging.file_path is required when output is file",
            ));
        }

        Ok(())
    }

    /// Returns the controller name (configured name or hostname).
    pub fn controller_name(&self) -> String {
        self.controller.name.clone().unwrap_or_else(|| {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string())
        })
    }
}
