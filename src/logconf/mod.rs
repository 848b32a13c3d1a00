//! Logging configuration distribution.
//!
//! This module validates per-project logging configurations, routes them to
//! collector agents, records them durably and re-sends them after a restart.

pub mod args;
pub mod delivery;
pub mod selector;
pub mod store;


use crate::agent::{AgentPool, Collector, AgentRegistry};
use crate::config::Config;
use crate::error::{LoghubError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

// Re-exports for convenience
pub use args::{CollectMode, ConfigArgs, FileConfig, K8sConfig, LoggingConfigRequest};
pub use delivery::StartAck;
pub use store::{Assignment, AssignmentStore};

/// Routes logging configurations to agents and keeps the project index.
///
/// The index holds one assignment per project and is only ever replaced
/// whole, under a single lock that is never held across agent calls or
/// file writes.
pub struct LoggingController {
    /// Connected collector agents.
    pool: Arc<dyn AgentPool>,
    /// Durable assignment records.
    store: AssignmentStore,
    /// Endpoint agents ship logs to.
    report_endpoint: String,
    /// Bound on the start acknowledgment wait.
    ack_timeout: Duration,
    /// Project id to current assignment.
    index: Mutex<HashMap<i64, Assignment>>,
}

impl LoggingController {
    /// Creates a controller over an agent pool and a store.
    pub fn new(
        pool: Arc<dyn AgentPool>,
        store: AssignmentStore,
        report_endpoint: impl Into<String>,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            store,
            report_endpoint: report_endpoint.into(),
            ack_timeout,
            index: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a controller from configuration, with HTTP collectors for
    /// every configured agent.
    pub fn from_config(config: &Config) -> Result<Self> {
        let pool = AgentRegistry::from_endpoints(&config.agents, config.timeout.http())?;

        Ok(Self::new(
            Arc::new(pool),
            AssignmentStore::new(&config.controller.data_dir),
            config.controller.report_endpoint.clone(),
            config.timeout.ack(),
        ))
    }

    /// Returns the agent pool.
    pub fn pool(&self) -> &dyn AgentPool {
        self.pool.as_ref()
    }

    /// Applies a configuration request.
    ///
    /// The request is validated, routed, persisted and only then indexed.
    /// Nothing is persisted when no collector is available or the clustered
    /// push fails, and the index is untouched when persisting fails.
    pub async fn configure(&self, request: &LoggingConfigRequest) -> Result<Assignment> {
        let (project_id, args) = ConfigArgs::build(request)?;

        // Collection state belongs to the running job, not to the config.
        let started = self
            .index
            .lock()
            .await
            .get(&project_id)
            .map(|a| a.started)
            .unwrap_or(false);

        let mut assignment = Assignment {
            id: project_id,
            args,
            cid: String::new(),
            started,
        };

        let cid = match &assignment.args.mode {
            CollectMode::K8s(k8s) => {
                let agent = selector::select_collector(self.pool(), project_id, k8s)?;
                delivery::deliver(
                    agent.as_ref(),
                    &assignment,
                    &self.report_endpoint,
                    self.ack_timeout,
                )
                .await?;
                agent.id().to_string()
            }
            CollectMode::File(_) => {
                delivery::broadcast(self.pool(), &assignment, &self.report_endpoint).await
            }
        };
        assignment.cid = cid;

        self.store.save(&assignment).await?;
        self.index
            .lock()
            .await
            .insert(project_id, assignment.clone());

        info!(
            project_id,
            mode = assignment.args.mode.name(),
            collector = %assignment.cid,
            started = assignment.started,
            "Logging config applied"
        );
        Ok(assignment)
    }

    /// Marks collection of a clustered project as running.
    ///
    /// Only an explicit acknowledgment from the owning collector flips the
    /// flag; any other outcome is returned as an error and nothing changes.
    pub async fn start(&self, project_id: i64) -> Result<Assignment> {
        let mut assignment = self
            .get(project_id)
            .await
            .ok_or(LoghubError::ProjectNotFound { project_id })?;

        if !assignment.has_collector() {
            return Err(LoghubError::invalid_parameter("type"));
        }

        let agent = self
            .pool
            .get(&assignment.cid)
            .ok_or(LoghubError::NoCollectorAvailable)?;
        delivery::request_start(agent.as_ref(), project_id, self.ack_timeout).await?;

        assignment.started = true;
        self.store.save(&assignment).await?;
        self.index
            .lock()
            .await
            .insert(project_id, assignment.clone());

        info!(project_id, collector = %assignment.cid, "Logging started");
        Ok(assignment)
    }

    /// Re-sends an assignment to where it was routed before, without
    /// selecting again.
    pub async fn resend(&self, assignment: &Assignment) {
        match &assignment.args.mode {
            CollectMode::K8s(_) => match self.pool.get(&assignment.cid) {
                Some(agent) => {
                    if let Err(err) = delivery::deliver(
                        agent.as_ref(),
                        assignment,
                        &self.report_endpoint,
                        self.ack_timeout,
                    )
                    .await
                    {
                        error!(
                            project_id = assignment.id,
                            agent = %assignment.cid,
                            error = %err,
                            "Resend of logging config failed"
                        );
                    }
                }
                None => {
                    warn!(
                        project_id = assignment.id,
                        agent = %assignment.cid,
                        "Collector not connected; config is resent when it connects"
                    );
                }
            },
            CollectMode::File(_) => {
                delivery::broadcast(self.pool(), assignment, &self.report_endpoint).await;
            }
        }
    }

    /// Loads every stored assignment into the index and re-sends it.
    ///
    /// Returns the number of projects resumed.
    pub async fn resume(&self) -> Result<usize> {
        let assignments = self.store.load_all().await?;

        {
            let mut index = self.index.lock().await;
            for assignment in &assignments {
                index.insert(assignment.id, assignment.clone());
            }
        }

        for assignment in &assignments {
            self.resend(assignment).await;
        }

        info!(projects = assignments.len(), "Logging assignments resumed");
        Ok(assignments.len())
    }

    /// Adds an agent to the pool and re-pushes what it should be running.
    ///
    /// An agent registering under an id already in the pool replaces the
    /// previous entry. Returns the number of assignments sent.
    pub async fn register_agent(&self, agent: Arc<dyn Collector>) -> usize {
        self.pool.register(Arc::clone(&agent));
        info!(agent = %agent.id(), agents = self.pool.count(), "Agent registered");
        self.agent_connected(agent.as_ref()).await
    }

    /// Re-pushes everything a (re)connected agent should be running: the
    /// clustered projects it owns and every file-tail project.
    ///
    /// Returns the number of assignments sent.
    pub async fn agent_connected(&self, agent: &dyn Collector) -> usize {
        let mut sent = 0;

        for assignment in self.list().await {
            let result = match &assignment.args.mode {
                CollectMode::K8s(_) if assignment.cid == agent.id() => delivery::deliver(
                    agent,
                    &assignment,
                    &self.report_endpoint,
                    self.ack_timeout,
                )
                .await
                .map(|_| ()),
                CollectMode::File(_) => {
                    delivery::push(agent, &assignment, &self.report_endpoint).await
                }
                CollectMode::K8s(_) => continue,
            };

            match result {
                Ok(()) => sent += 1,
                Err(err) => error!(
                    project_id = assignment.id,
                    agent = %agent.id(),
                    error = %err,
                    "Resend to connected agent failed"
                ),
            }
        }

        info!(agent = %agent.id(), sent, "Agent connected");
        sent
    }

    /// Returns the current assignment of a project.
    pub async fn get(&self, project_id: i64) -> Option<Assignment> {
        self.index.lock().await.get(&project_id).cloned()
    }

    /// Returns every assignment, ordered by project id.
    pub async fn list(&self) -> Vec<Assignment> {
        let mut assignments: Vec<Assignment> =
            self.index.lock().await.values().cloned().collect();
        assignments.sort_by_key(|a| a.id);
        assignments
    }

    /// Number of projects with an assignment.
    pub async fn project_count(&self) -> usize {
        self.index.lock().await.len()
    }
}
