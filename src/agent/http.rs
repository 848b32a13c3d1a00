//! HTTP transport for collector agents.
//!
//! Agents expose two endpoints: `POST /api/v1/logging/config` accepting a
//! [`LoggingConfigMessage`] and `POST /api/v1/logging/start` accepting a
//! [`StartLoggingMessage`] and answering with an [`AgentReply`].
//!
//! The request timeout bounds connecting and config pushes. Start commands
//! carry no request timeout of their own; the controller's acknowledgment
//! wait bounds them.

use crate::agent::collector::{AgentReply, Collector, LoggingConfigMessage, StartLoggingMessage};
use crate::config::AgentEndpoint;
use crate::error::{LoghubError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Collector reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCollector {
    /// Agent identity.
    id: String,
    /// HTTP client.
    client: Client,
    /// Base URL of the agent.
    base_url: String,
    /// Bound on a config push.
    timeout: Duration,
}

impl HttpCollector {
    /// Creates a collector for the agent at `base_url`.
    pub fn new(id: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().connect_timeout(timeout).build().map_err(|e| {
            LoghubError::config_with_source("Failed to create HTTP client".to_string(), e)
        })?;

        Ok(Self {
            id: id.into(),
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Creates a collector from a configured endpoint.
    pub fn from_endpoint(endpoint: &AgentEndpoint, timeout: Duration) -> Result<Self> {
        Self::new(&endpoint.id, &endpoint.address, timeout)
    }

    /// Returns the base URL of the agent.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Collector for HttpCollector {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_logging_config(&self, message: &LoggingConfigMessage) -> Result<()> {
        let url = format!("{}/api/v1/logging/config", self.base_url);
        debug!(agent = %self.id, url = %url, project_id = message.project_id, "Pushing logging config");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(message)
            .send()
            .await
            .map_err(|e| LoghubError::delivery_with_source(&self.id, "send logging config", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoghubError::delivery(
                &self.id,
                format!("logging config rejected with HTTP {}", status.as_u16()),
            ));
        }

        Ok(())
    }

    async fn start_logging(&self, project_id: i64) -> Result<AgentReply> {
        let url = format!("{}/api/v1/logging/start", self.base_url);
        debug!(agent = %self.id, url = %url, project_id, "Sending logging start");

        let response = self
            .client
            .post(&url)
            .json(&StartLoggingMessage { project_id })
            .send()
            .await
            .map_err(|e| LoghubError::delivery_with_source(&self.id, "send logging start", e))?;

        // Error replies may come with a non-2xx status; the body decides.
        let status = response.status();
        response.json::<AgentReply>().await.map_err(|e| {
            LoghubError::delivery_with_source(
                &self.id,
                format!("undecodable start reply (HTTP {})", status.as_u16()),
                e,
            )
        })
    }
}
