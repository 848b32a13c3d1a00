//! In-process collector double for tests.

use crate::agent::collector::{AgentReply, Collector, LoggingConfigMessage};
use crate::agent::{AgentPool, AgentRegistry};
use crate::error::{LoghubError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// How a mock agent answers a start command.
#[derive(Debug, Clone)]
pub enum StartBehavior {
    /// Return this reply.
    Reply(AgentReply),
    /// Fail to send the command.
    Fail,
    /// Never answer.
    Hang,
}

/// Collector that records what it receives.
pub struct MockCollector {
    id: String,
    fail_push: bool,
    start: StartBehavior,
    pushes: Mutex<Vec<LoggingConfigMessage>>,
    starts: Mutex<Vec<i64>>,
}

impl MockCollector {
    /// An agent that accepts pushes and acknowledges starts.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fail_push: false,
            start: StartBehavior::Reply(AgentReply::LoggingStatus { ok: true }),
            pushes: Mutex::new(Vec::new()),
            starts: Mutex::new(Vec::new()),
        }
    }

    /// Makes every push fail.
    pub fn failing(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Sets the start command behavior.
    pub fn on_start(mut self, behavior: StartBehavior) -> Self {
        self.start = behavior;
        self
    }

    /// Messages pushed so far.
    pub fn pushes(&self) -> Vec<LoggingConfigMessage> {
        self.pushes.lock().unwrap().clone()
    }

    /// Project ids of start commands received so far.
    pub fn starts(&self) -> Vec<i64> {
        self.starts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Collector for MockCollector {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_logging_config(&self, message: &LoggingConfigMessage) -> Result<()> {
        if self.fail_push {
            return Err(LoghubError::delivery(&self.id, "connection reset"));
        }
        self.pushes.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn start_logging(&self, project_id: i64) -> Result<AgentReply> {
        self.starts.lock().unwrap().push(project_id);
        match &self.start {
            StartBehavior::Reply(reply) => Ok(reply.clone()),
            StartBehavior::Fail => Err(LoghubError::delivery(&self.id, "connection reset")),
            StartBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Builds a pool and keeps typed handles to its agents.
pub fn pool_with(agents: Vec<MockCollector>) -> (Arc<dyn AgentPool>, Vec<Arc<MockCollector>>) {
    let handles: Vec<Arc<MockCollector>> = agents.into_iter().map(Arc::new).collect();
    let pool = AgentRegistry::from_collectors(
        handles
            .iter()
            .map(|agent| Arc::clone(agent) as Arc<dyn Collector>),
    );
    (Arc::new(pool), handles)
}
