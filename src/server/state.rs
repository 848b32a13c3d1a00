//! Application state management.
//!
//! This module manages the shared state across HTTP request handlers.

use crate::config::Config;
use crate::error::Result;
use crate::logconf::LoggingController;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Shared application state.
pub struct AppState {
    /// Logging configuration controller.
    pub controller: LoggingController,
    /// Application start time.
    pub start_time: Instant,
    /// Controller name.
    pub controller_name: String,
    /// Endpoint agents ship logs to.
    pub report_endpoint: String,
    /// Server bind address.
    pub server_bind: String,
    /// Server port.
    pub server_port: u16,
    /// Request timeout for collectors that register over the API.
    pub agent_timeout: Duration,
    /// Statistics counters.
    pub stats: Stats,
}

impl AppState {
    /// Creates a new application state from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let controller = LoggingController::from_config(config)?;
        Ok(Self::with_controller(config, controller))
    }

    /// Creates application state around an existing controller.
    pub fn with_controller(config: &Config, controller: LoggingController) -> Self {
        Self {
            controller,
            start_time: Instant::now(),
            controller_name: config.controller_name(),
            report_endpoint: config.controller.report_endpoint.clone(),
            server_bind: config.server.bind.clone(),
            server_port: config.server.port,
            agent_timeout: config.timeout.http(),
            stats: Stats::default(),
        }
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Increments the total request counter.
    pub fn increment_requests(&self) {
        self.stats.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the successful request counter.
    pub fn increment_success(&self) {
        self.stats.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the failed request counter.
    pub fn increment_failed(&self) {
        self.stats.requests_failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Statistics counters.
#[derive(Default)]
pub struct Stats {
    /// Total requests received.
    pub requests_total: AtomicU64,
    /// Successful requests.
    pub requests_success: AtomicU64,
    /// Failed requests.
    pub requests_failed: AtomicU64,
}

impl Stats {
    /// Gets the current statistics as a snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of statistics counters.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentEndpoint;
    use tempfile::TempDir;

    fn create_test_config(tmp: &TempDir) -> Config {
        let mut config = Config::default();
        config.controller.name = Some("test-controller".to_string());
        config.controller.data_dir = tmp.path().to_path_buf();
        config.controller.report_endpoint = "http://hub:8080/report".to_string();
        config.agents = vec![AgentEndpoint {
            id: "k8s-a".to_string(),
            address: "http://10.0.0.5:9100".to_string(),
            tags: vec![],
        }];
        config
    }

    #[test]
    fn test_app_state_new() {
        let tmp = TempDir::new().unwrap();
        let state = AppState::new(&create_test_config(&tmp)).unwrap();

        assert_eq!(state.controller_name, "test-controller");
        assert_eq!(state.report_endpoint, "http://hub:8080/report");
        assert_eq!(state.server_bind, "0.0.0.0");
        assert_eq!(state.server_port, 8080);
        assert_eq!(state.controller.pool().count(), 1);
        assert!(state.uptime_seconds() < 1);
    }

    #[test]
    fn test_stats_increment() {
        let tmp = TempDir::new().unwrap();
        let state = AppState::new(&create_test_config(&tmp)).unwrap();

        state.increment_requests();
        state.increment_requests();
        state.increment_success();
        state.increment_failed();

        let snapshot = state.stats.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.requests_success, 1);
        assert_eq!(snapshot.requests_failed, 1);
    }
}
