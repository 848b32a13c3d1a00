//! Collector trait and the messages exchanged with agents.
//!
//! This module defines the `Collector` trait every agent transport must
//! implement, along with the outbound message shapes and the typed reply an
//! agent returns to a start command.

use crate::error::Result;
use crate::logconf::{CollectMode, ConfigArgs};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// "Set logging config" message pushed to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfigMessage {
    /// Project the configuration belongs to.
    pub project_id: i64,
    /// Exclusion pattern; empty when unset.
    pub exclude: String,
    /// Lines per shipped batch.
    pub batch: u32,
    /// Read buffer size.
    pub buffer: u32,
    /// Flush interval in seconds.
    pub interval: u32,
    /// Endpoint the agent ships collected logs to.
    pub report: String,
    /// Mode payload, serialized as a single `k8s` or `file` key.
    #[serde(flatten)]
    pub mode: CollectMode,
}

impl LoggingConfigMessage {
    /// Builds the message for a project from its validated arguments.
    pub fn new(project_id: i64, args: &ConfigArgs, report: &str) -> Self {
        Self {
            project_id,
            exclude: args.exclude.clone(),
            batch: args.batch,
            buffer: args.buffer,
            interval: args.interval,
            report: report.to_string(),
            mode: args.mode.clone(),
        }
    }
}

/// "Start logging" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartLoggingMessage {
    /// Project whose collection should run.
    pub project_id: i64,
}

/// Reply to a start command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentReply {
    /// The agent failed to process the command.
    Error {
        #[serde(default)]
        message: String,
    },
    /// Collection status after the command.
    LoggingStatus { ok: bool },
    /// Any reply of another type.
    #[serde(other)]
    Other,
}

impl AgentReply {
    /// Only an explicit successful status counts as acknowledgment.
    pub fn is_ack(&self) -> bool {
        matches!(self, AgentReply::LoggingStatus { ok: true })
    }
}

/// A connected collector agent.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Stable agent identity.
    fn id(&self) -> &str;

    /// Pushes a logging configuration to the agent.
    async fn send_logging_config(&self, message: &LoggingConfigMessage) -> Result<()>;

    /// Sends a start command and returns the agent's reply.
    ///
    /// Callers bound the wait themselves.
    async fn start_logging(&self, project_id: i64) -> Result<AgentReply>;
}
