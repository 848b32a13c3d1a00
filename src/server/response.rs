//! API response types and formatting.
//!
//! This module defines the standard API response format used by all endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorResponse, LoghubError};
use crate::logconf::{Assignment, ConfigArgs};

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error information (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
    /// Response timestamp.
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a failed response with an error.
    pub fn error(error: ErrorResponse) -> ApiResponse<T> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }

    /// Creates a failed response from a LoghubError.
    pub fn from_error(err: &LoghubError) -> ApiResponse<T> {
        Self::error(ErrorResponse::from_error(err))
    }
}

/// Health check response data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthData {
    /// Health status.
    pub status: HealthStatus,
    /// Application version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// Health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Controller is serving requests.
    Healthy,
    /// Serving, but no collector agent is registered.
    Degraded,
}

/// Controller status response data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusData {
    /// Controller information.
    pub controller: ControllerInfo,
    /// Server information.
    pub server: ServerInfo,
    /// Distribution counts.
    pub logging: LoggingInfo,
    /// Statistics.
    pub stats: StatsInfo,
    /// Application version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// Controller information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerInfo {
    /// Controller name.
    pub name: String,
    /// Endpoint agents ship logs to.
    pub report_endpoint: String,
}

/// Server information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Bind address.
    pub bind: String,
    /// Port number.
    pub port: u16,
}

/// Agent and project counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingInfo {
    /// Registered collector agents.
    pub agents: usize,
    /// Projects with an assignment.
    pub projects: usize,
    /// Projects whose collection is running.
    pub started: usize,
}

/// Statistics information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsInfo {
    /// Total requests received.
    pub requests_total: u64,
    /// Successful requests.
    pub requests_success: u64,
    /// Failed requests.
    pub requests_failed: u64,
}

/// One project in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Project id.
    pub project_id: i64,
    /// Collection mode (`k8s` or `logtail`).
    #[serde(rename = "type")]
    pub mode: String,
    /// Owning collector; absent for broadcast projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collector: Option<String>,
    /// Whether collection is running.
    pub started: bool,
}

impl From<&Assignment> for ProjectSummary {
    fn from(assignment: &Assignment) -> Self {
        Self {
            project_id: assignment.id,
            mode: assignment.args.mode.name().to_string(),
            collector: (!assignment.cid.is_empty()).then(|| assignment.cid.clone()),
            started: assignment.started,
        }
    }
}

/// Project list response data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsListData {
    /// Projects ordered by id.
    pub projects: Vec<ProjectSummary>,
    /// Total number of projects.
    pub total: usize,
}

/// Project detail response data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetailData {
    /// Project summary.
    #[serde(flatten)]
    pub project: ProjectSummary,
    /// Full logging configuration.
    pub args: ConfigArgs,
}

impl From<&Assignment> for ProjectDetailData {
    fn from(assignment: &Assignment) -> Self {
        Self {
            project: ProjectSummary::from(assignment),
            args: assignment.args.clone(),
        }
    }
}

/// Response data for configuration and start requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectOperationData {
    /// Request ID.
    pub request_id: Uuid,
    /// Operation performed (`configure` or `start`).
    pub action: String,
    /// Resulting project state.
    #[serde(flatten)]
    pub project: ProjectSummary,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

/// Response data for agent registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRegistrationData {
    /// Registered agent id.
    pub agent_id: String,
    /// Agent base URL.
    pub address: String,
    /// Assignments re-sent to the agent.
    pub resent: usize,
}
