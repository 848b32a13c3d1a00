//! Loghub HTTP client API.
//!
//! This module provides the client the CLI uses to talk to a running
//! controller.

use crate::error::{ErrorCode, LoghubError, Result};
use crate::logconf::LoggingConfigRequest;
use crate::server::response::{
    ApiResponse, HealthData, ProjectDetailData, ProjectOperationData, ProjectsListData,
    StatusData,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for HTTP requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the controller API.
#[derive(Debug, Clone)]
pub struct LoghubClient {
    /// HTTP client.
    client: Client,
    /// Base URL of the controller.
    base_url: String,
}

impl LoghubClient {
    /// Creates a new client for the specified controller URL.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the controller (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new client with custom timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoghubError::connection_with_source(base_url.clone(), e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks the health of the controller.
    pub async fn health(&self) -> Result<HealthData> {
        let url = self.url("/api/v1/health");
        debug!(url = %url, "Checking controller health");
        self.send(self.client.get(&url)).await
    }

    /// Gets the status of the controller.
    pub async fn status(&self) -> Result<StatusData> {
        let url = self.url("/api/v1/status");
        debug!(url = %url, "Getting controller status");
        self.send(self.client.get(&url)).await
    }

    /// Submits a logging configuration request.
    ///
    /// # Returns
    /// The resulting project state.
    pub async fn configure(&self, request: &LoggingConfigRequest) -> Result<ProjectOperationData> {
        let url = self.url("/api/v1/logging/config");
        info!(
            url = %url,
            project_id = ?request.project_id,
            mode = ?request.mode,
            "Sending logging config request"
        );
        self.send(self.client.post(&url).json(request)).await
    }

    /// Starts collection for a clustered project.
    pub async fn start(&self, project_id: i64) -> Result<ProjectOperationData> {
        let url = self.url(&format!("/api/v1/logging/projects/{}/start", project_id));
        info!(url = %url, project_id, "Sending logging start request");
        self.send(self.client.post(&url)).await
    }

    /// Lists every project with an assignment.
    pub async fn list_projects(&self) -> Result<ProjectsListData> {
        let url = self.url("/api/v1/logging/projects");
        debug!(url = %url, "Listing projects");
        self.send(self.client.get(&url)).await
    }

    /// Gets one project's assignment.
    pub async fn get_project(&self, project_id: i64) -> Result<ProjectDetailData> {
        let url = self.url(&format!("/api/v1/logging/projects/{}", project_id));
        debug!(url = %url, project_id, "Getting project details");
        self.send(self.client.get(&url)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and unwraps the response envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| LoghubError::connection_with_source(&self.base_url, e))?;

        let api_response: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| LoghubError::connection_with_source(&self.base_url, e))?;

        if api_response.success {
            api_response.data.ok_or_else(|| {
                LoghubError::connection(format!("{} (empty response)", self.base_url))
            })
        } else {
            Err(Self::extract_error(&api_response))
        }
    }

    /// Extracts an error from an API response.
    fn extract_error<T>(response: &ApiResponse<T>) -> LoghubError {
        match &response.error {
            Some(err) => LoghubError::Remote {
                code: err.code,
                message: err.message.clone(),
            },
            None => LoghubError::Remote {
                code: ErrorCode::Internal,
                message: "Unknown error".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{pool_with, MockCollector};
    use crate::config::Config;
    use crate::logconf::{AssignmentStore, LoggingController};
    use crate::server::create_router;
    use crate::server::response::HealthStatus;
    use crate::server::state::AppState;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    async fn spawn_controller(tmp: &TempDir, agents: Vec<MockCollector>) -> LoghubClient {
        let (pool, _) = pool_with(agents);
        let controller = LoggingController::new(
            pool,
            AssignmentStore::new(tmp.path()),
            "http://hub/report",
            Duration::from_millis(100),
        );
        let state = Arc::new(AppState::with_controller(&Config::default(), controller));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        LoghubClient::new(format!("http://{}/", addr)).unwrap()
    }

    fn k8s_request(project_id: i64) -> LoggingConfigRequest {
        LoggingConfigRequest {
            project_id: Some(project_id),
            mode: Some("k8s".to_string()),
            namespace: Some("prod".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = LoghubClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let tmp = TempDir::new().unwrap();
        let client = spawn_controller(&tmp, vec![MockCollector::new("k8s-a")]).await;

        let health = client.health().await.unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);

        let status = client.status().await.unwrap();
        assert_eq!(status.logging.agents, 1);
        assert_eq!(status.logging.projects, 0);
    }

    #[tokio::test]
    async fn test_configure_start_and_query() {
        let tmp = TempDir::new().unwrap();
        let client = spawn_controller(&tmp, vec![MockCollector::new("prod-k8s-a")]).await;

        let configured = client.configure(&k8s_request(3)).await.unwrap();
        assert_eq!(configured.project.collector.as_deref(), Some("prod-k8s-a"));
        assert!(!configured.project.started);

        let started = client.start(3).await.unwrap();
        assert!(started.project.started);

        let projects = client.list_projects().await.unwrap();
        assert_eq!(projects.total, 1);

        let detail = client.get_project(3).await.unwrap();
        assert_eq!(detail.project.project_id, 3);
        assert_eq!(detail.args.batch, 1000);
    }

    #[tokio::test]
    async fn test_api_errors_keep_their_code() {
        let tmp = TempDir::new().unwrap();
        let client = spawn_controller(&tmp, vec![]).await;

        let err = client.configure(&k8s_request(3)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoCollectorAvailable);
        assert_eq!(err.to_string(), "1: no collector available");

        let err = client.get_project(8).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProjectNotFound);
    }

    #[tokio::test]
    async fn test_unreachable_controller() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LoghubClient::new(format!("http://{}", addr)).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, LoghubError::Connection { .. }));
    }
}
