//! Error types and error handling for loghub.
//!
//! This module defines all error types used throughout the application,
//! including error codes, error responses for the API, and CLI exit codes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes returned to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// E001: A request parameter is missing or invalid
    #[serde(rename = "E001")]
    InvalidParameter,

    /// 1: No collector agent can take the configuration
    #[serde(rename = "1")]
    NoCollectorAvailable,

    /// E003: Project has no assignment
    #[serde(rename = "E003")]
    ProjectNotFound,

    /// E004: Delivery to an agent failed
    #[serde(rename = "E004")]
    DeliveryFailed,

    /// E005: Operation timed out
    #[serde(rename = "E005")]
    Timeout,

    /// E006: Failed to reach a remote endpoint
    #[serde(rename = "E006")]
    ConnectionError,

    /// E007: Configuration file is invalid
    #[serde(rename = "E007")]
    ConfigInvalid,

    /// E008: Unexpected internal failure
    #[serde(rename = "E008")]
    Internal,
}

impl ErrorCode {
    /// Returns the error code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "E001",
            ErrorCode::NoCollectorAvailable => "1",
            ErrorCode::ProjectNotFound => "E003",
            ErrorCode::DeliveryFailed => "E004",
            ErrorCode::Timeout => "E005",
            ErrorCode::ConnectionError => "E006",
            ErrorCode::ConfigInvalid => "E007",
            ErrorCode::Internal => "E008",
        }
    }

    /// Returns the default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "Bad parameter",
            ErrorCode::NoCollectorAvailable => "No collector available",
            ErrorCode::ProjectNotFound => "Project not found",
            ErrorCode::DeliveryFailed => "Delivery to agent failed",
            ErrorCode::Timeout => "Operation timed out",
            ErrorCode::ConnectionError => "Failed to connect to remote endpoint",
            ErrorCode::ConfigInvalid => "Configuration file is invalid",
            ErrorCode::Internal => "Internal error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidParameter => 400,
            ErrorCode::NoCollectorAvailable => 503,
            ErrorCode::ProjectNotFound => 404,
            ErrorCode::DeliveryFailed => 502,
            ErrorCode::Timeout => 504,
            ErrorCode::ConnectionError => 502,
            ErrorCode::ConfigInvalid => 500,
            ErrorCode::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CLI exit codes.
pub mod exit_code {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// General error
    pub const GENERAL_ERROR: i32 = 1;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 2;
    /// Connection error
    pub const CONNECTION_ERROR: i32 = 3;
    /// Timeout error
    pub const TIMEOUT_ERROR: i32 = 4;
    /// Rejected request
    pub const REQUEST_ERROR: i32 = 5;
    /// Command line argument error
    pub const CLI_ERROR: i32 = 64;
}

/// The main error type for loghub.
#[derive(Debug, Error)]
pub enum LoghubError {
    /// A request parameter failed validation.
    #[error("bad parameter: {name}")]
    InvalidParameter { name: String },

    /// The request names a collection mode that has no payload builder.
    #[error("bad parameter: type: unsupported mode {mode}")]
    UnsupportedMode { mode: String },

    /// No agent matches the clustered-mode grouping.
    #[error("no collector available")]
    NoCollectorAvailable,

    /// No assignment is recorded for the project.
    #[error("Project not found: {project_id}")]
    ProjectNotFound { project_id: i64 },

    /// Sending to an agent failed or the agent rejected the command.
    #[error("Delivery to agent {agent} failed: {message}")]
    Delivery {
        agent: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing or reading an assignment record failed.
    #[error("Persistence error: {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("Timeout: {operation} (waited {seconds}s)")]
    Timeout { operation: String, seconds: u64 },

    /// Configuration file is invalid or cannot be loaded.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to reach a remote endpoint.
    #[error("Connection error: {target}")]
    Connection {
        target: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The controller API answered with an error.
    #[error("{code}: {message}")]
    Remote { code: ErrorCode, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoghubError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            LoghubError::InvalidParameter { .. } | LoghubError::UnsupportedMode { .. } => {
                ErrorCode::InvalidParameter
            }
            LoghubError::NoCollectorAvailable => ErrorCode::NoCollectorAvailable,
            LoghubError::ProjectNotFound { .. } => ErrorCode::ProjectNotFound,
            LoghubError::Delivery { .. } => ErrorCode::DeliveryFailed,
            LoghubError::Timeout { .. } => ErrorCode::Timeout,
            LoghubError::Connection { .. } => ErrorCode::ConnectionError,
            LoghubError::Config { .. } | LoghubError::Yaml(_) => ErrorCode::ConfigInvalid,
            LoghubError::Remote { code, .. } => *code,
            LoghubError::Persistence { .. } | LoghubError::Io(_) | LoghubError::Json(_) => {
                ErrorCode::Internal
            }
        }
    }

    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoghubError::Config { .. } | LoghubError::Yaml(_) => exit_code::CONFIG_ERROR,
            LoghubError::Connection { .. } => exit_code::CONNECTION_ERROR,
            LoghubError::Timeout { .. } => exit_code::TIMEOUT_ERROR,
            LoghubError::InvalidParameter { .. }
            | LoghubError::UnsupportedMode { .. }
            | LoghubError::NoCollectorAvailable
            | LoghubError::ProjectNotFound { .. } => exit_code::REQUEST_ERROR,
            LoghubError::Remote { code, .. } => match code {
                ErrorCode::InvalidParameter
                | ErrorCode::NoCollectorAvailable
                | ErrorCode::ProjectNotFound => exit_code::REQUEST_ERROR,
                ErrorCode::Timeout => exit_code::TIMEOUT_ERROR,
                _ => exit_code::GENERAL_ERROR,
            },
            _ => exit_code::GENERAL_ERROR,
        }
    }

    /// Returns true for failures the caller caused, as opposed to faults in
    /// the controller or its agents.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            LoghubError::InvalidParameter { .. }
                | LoghubError::UnsupportedMode { .. }
                | LoghubError::NoCollectorAvailable
                | LoghubError::ProjectNotFound { .. }
        )
    }

    /// Creates a bad parameter error naming the offending field.
    pub fn invalid_parameter(name: impl Into<String>) -> Self {
        LoghubError::InvalidParameter { name: name.into() }
    }

    /// Creates a delivery error with a message.
    pub fn delivery(agent: impl Into<String>, message: impl Into<String>) -> Self {
        LoghubError::Delivery {
            agent: agent.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a delivery error with a message and source.
    pub fn delivery_with_source(
        agent: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LoghubError::Delivery {
            agent: agent.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a persistence error for the given record path.
    pub fn persistence(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LoghubError::Persistence {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Creates a configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        LoghubError::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error with a message and source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LoghubError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a connection error.
    pub fn connection(target: impl Into<String>) -> Self {
        LoghubError::Connection {
            target: target.into(),
            source: None,
        }
    }

    /// Creates a connection error with a source.
    pub fn connection_with_source(
        target: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LoghubError::Connection {
            target: target.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Error details for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Additional context fields.
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl ErrorDetails {
    /// Creates empty error details.
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Adds a field to the error details.
    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl Default for ErrorDetails {
    fn default() -> Self {
        Self::new()
    }
}

/// Error response structure for the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "E001").
    pub code: ErrorCode,

    /// Human-readable error message.
    pub message: String,

    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error response from a LoghubError.
    ///
    /// Internal failures keep their details out of the body; the full chain
    /// is logged by the handler instead.
    pub fn from_error(error: &LoghubError) -> Self {
        let code = error.code();
        let message = match code {
            ErrorCode::Internal => code.default_message().to_string(),
            _ => error.to_string(),
        };

        let details = match error {
            LoghubError::ProjectNotFound { project_id } => {
                Some(ErrorDetails::new().with_field("project_id", *project_id))
            }
            LoghubError::Delivery { agent, .. } => {
                Some(ErrorDetails::new().with_field("agent", agent.clone()))
            }
            LoghubError::Timeout { operation, seconds } => Some(
                ErrorDetails::new()
                    .with_field("operation", operation.clone())
                    .with_field("timeout_seconds", *seconds),
            ),
            LoghubError::Connection { target, .. } => {
                Some(ErrorDetails::new().with_field("target", target.clone()))
            }
            _ => None,
        };

        Self {
            code,
            message,
            details,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result type alias for loghub operations.
pub type Result<T> = std::result::Result<T, LoghubError>;
