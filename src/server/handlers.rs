//! HTTP request handlers.
//!
//! This module contains all the HTTP endpoint handlers for the loghub API.

use crate::agent::http::HttpCollector;
use crate::agent::Collector;
use crate::config::AgentEndpoint;
use crate::error::{ErrorCode, LoghubError};
use crate::logconf::LoggingConfigRequest;
use crate::server::response::{
    AgentRegistrationData, ApiResponse, ControllerInfo, HealthData, HealthStatus, LoggingInfo, ProjectDetailData,
    ProjectOperationData, ProjectSummary, ProjectsListData, ServerInfo, StatsInfo, StatusData,
};
use crate::server::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Version string for the application.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check handler.
///
/// GET /api/v1/health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();

    let status = if state.controller.pool().count() == 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let data = HealthData {
        status,
        version: VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    state.increment_success();
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// Controller status handler.
///
/// GET /api/v1/status
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();

    let projects = state.controller.list().await;
    let stats_snapshot = state.stats.snapshot();

    let data = StatusData {
        controller: ControllerInfo {
            name: state.controller_name.clone(),
            report_endpoint: state.report_endpoint.clone(),
        },
        server: ServerInfo {
            bind: state.server_bind.clone(),
            port: state.server_port,
        },
        logging: LoggingInfo {
            agents: state.controller.pool().count(),
            projects: projects.len(),
            started: projects.iter().filter(|a| a.started).count(),
        },
        stats: StatsInfo {
            requests_total: stats_snapshot.requests_total,
            requests_success: stats_snapshot.requests_success,
            requests_failed: stats_snapshot.requests_failed,
        },
        version: VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    state.increment_success();
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// Logging configuration handler.
///
/// POST /api/v1/logging/config
pub async fn configure(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoggingConfigRequest>, JsonRejection>,
) -> impl IntoResponse {
    state.increment_requests();

    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = body_error(&rejection);
            log_failure(&request_id, &err, "Logging config request rejected");
            state.increment_failed();
            return (
                status_code(&err),
                Json(ApiResponse::<ProjectOperationData>::from_error(&err)),
            );
        }
    };

    info!(
        request_id = %request_id,
        project_id = ?request.project_id,
        mode = ?request.mode,
        "Processing logging config request"
    );

    match state.controller.configure(&request).await {
        Ok(assignment) => {
            let data = ProjectOperationData {
                request_id,
                action: "configure".to_string(),
                project: ProjectSummary::from(&assignment),
                duration_ms: start_time.elapsed().as_millis() as u64,
            };

            state.increment_success();
            (StatusCode::OK, Json(ApiResponse::success(data)))
        }
        Err(err) => {
            log_failure(&request_id, &err, "Logging config request failed");
            state.increment_failed();
            (
                status_code(&err),
                Json(ApiResponse::<ProjectOperationData>::from_error(&err)),
            )
        }
    }
}

/// List projects handler.
///
/// GET /api/v1/logging/projects
pub async fn list_projects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();

    let projects: Vec<ProjectSummary> = state
        .controller
        .list()
        .await
        .iter()
        .map(ProjectSummary::from)
        .collect();

    let data = ProjectsListData {
        total: projects.len(),
        projects,
    };

    state.increment_success();
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// Get project details handler.
///
/// GET /api/v1/logging/projects/:id
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> impl IntoResponse {
    state.increment_requests();

    match state.controller.get(project_id).await {
        Some(assignment) => {
            state.increment_success();
            (
                StatusCode::OK,
                Json(ApiResponse::success(ProjectDetailData::from(&assignment))),
            )
        }
        None => {
            state.increment_failed();
            let err = LoghubError::ProjectNotFound { project_id };
            (
                status_code(&err),
                Json(ApiResponse::<ProjectDetailData>::from_error(&err)),
            )
        }
    }
}

/// Start project collection handler.
///
/// POST /api/v1/logging/projects/:id/start
pub async fn start_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> impl IntoResponse {
    state.increment_requests();

    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    info!(request_id = %request_id, project_id, "Processing logging start request");

    match state.controller.start(project_id).await {
        Ok(assignment) => {
            let data = ProjectOperationData {
                request_id,
                action: "start".to_string(),
                project: ProjectSummary::from(&assignment),
                duration_ms: start_time.elapsed().as_millis() as u64,
            };

            state.increment_success();
            (StatusCode::OK, Json(ApiResponse::success(data)))
        }
        Err(err) => {
            log_failure(&request_id, &err, "Logging start request failed");
            state.increment_failed();
            (
                status_code(&err),
                Json(ApiResponse::<ProjectOperationData>::from_error(&err)),
            )
        }
    }
}

/// Agent registration handler.
///
/// POST /api/v1/agents
pub async fn register_agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentEndpoint>, JsonRejection>,
) -> impl IntoResponse {
    state.increment_requests();

    let request_id = Uuid::new_v4();

    let collector = payload
        .map_err(|rejection| body_error(&rejection))
        .and_then(|Json(endpoint)| {
            if endpoint.id.is_empty() {
                return Err(LoghubError::invalid_parameter("id"));
            }
            if endpoint.address.is_empty() {
                return Err(LoghubError::invalid_parameter("address"));
            }
            HttpCollector::from_endpoint(&endpoint, state.agent_timeout)
        });

    match collector {
        Ok(collector) => {
            let agent_id = collector.id().to_string();
            let address = collector.base_url().to_string();
            info!(
                request_id = %request_id,
                agent = %agent_id,
                address = %address,
                "Registering agent"
            );

            let resent = state.controller.register_agent(Arc::new(collector)).await;
            let data = AgentRegistrationData {
                agent_id,
                address,
                resent,
            };

            state.increment_success();
            (StatusCode::OK, Json(ApiResponse::success(data)))
        }
        Err(err) => {
            log_failure(&request_id, &err, "Agent registration rejected");
            state.increment_failed();
            (
                status_code(&err),
                Json(ApiResponse::<AgentRegistrationData>::from_error(&err)),
            )
        }
    }
}

/// Turns an undecodable JSON body into a bad parameter error.
fn body_error(rejection: &JsonRejection) -> LoghubError {
    debug!(reason = %rejection.body_text(), "Request body rejected");
    LoghubError::invalid_parameter("body")
}

/// Maps an error to its HTTP status.
fn status_code(err: &LoghubError) -> StatusCode {
    StatusCode::from_u16(err.code().http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Rejections are logged as warnings, everything else as errors.
fn log_failure(request_id: &Uuid, err: &LoghubError, message: &str) {
    if err.is_request_error() {
        warn!(request_id = %request_id, error = %err, "{}", message);
    } else if err.code() == ErrorCode::Internal {
        error!(request_id = %request_id, error = ?err, "{}", message);
    } else {
        error!(request_id = %request_id, error = %err, "{}", message);
    }
}
