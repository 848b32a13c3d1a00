//! loghub - Log collection configuration controller
//!
//! This crate routes per-project logging configurations to collector agents,
//! records every accepted configuration durably and re-sends the recorded
//! configurations after a restart or when an agent connects.
//!
//! # Overview
//!
//! Clustered (`k8s`) projects are owned by one collector, picked
//! deterministically from the namespace group or the shared group. File-tail
//! (`logtail`) projects are broadcast to every agent. A clustered project
//! whose collection is running is re-started on every delivery and the
//! controller waits a bounded time for the agent's acknowledgment.
//!
//! # Modules
//!
//! - [`agent`] - Collector trait, agent pool and HTTP collector
//! - [`logconf`] - Request validation, selection, delivery and the controller
//! - [`server`] - HTTP API
//! - [`client`] - HTTP client for the API
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Configuration file parsing and validation
//! - [`error`] - Error types and error handling

pub mod agent;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logconf;
pub mod server;

// Re-exports for convenience
pub use cli::Cli;
pub use client::LoghubClient;
pub use config::Config;
pub use error::{ErrorCode, LoghubError, Result};
pub use logconf::LoggingController;
pub use server::serve;
