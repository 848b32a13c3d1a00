//! Configuration delivery to agents.
//!
//! A delivery pushes the configuration and, when the project's collection is
//! already running, asks the same agent to start it and waits a bounded time
//! for the acknowledgment. Broadcast delivery only pushes.

use crate::agent::{AgentPool, AgentReply, Collector, LoggingConfigMessage};
use crate::error::{LoghubError, Result};
use crate::logconf::store::Assignment;
use std::time::Duration;
use tracing::{debug, error, info};

/// Outcome of the start phase of a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartAck {
    /// Collection was not running, so no start command was sent.
    NotRequested,
    /// The agent confirmed the start.
    Confirmed,
    /// The start was not confirmed; carries the reason.
    Failed(String),
}

/// Pushes the assignment's configuration to one agent.
pub async fn push(agent: &dyn Collector, assignment: &Assignment, report: &str) -> Result<()> {
    let message = LoggingConfigMessage::new(assignment.id, &assignment.args, report);
    agent.send_logging_config(&message).await
}

/// Sends a start command and waits up to `ack_timeout` for a successful
/// status reply.
pub async fn request_start(
    agent: &dyn Collector,
    project_id: i64,
    ack_timeout: Duration,
) -> Result<()> {
    let reply = tokio::time::timeout(ack_timeout, agent.start_logging(project_id))
        .await
        .map_err(|_| LoghubError::Timeout {
            operation: format!("logging start of project {} on {}", project_id, agent.id()),
            seconds: ack_timeout.as_secs(),
        })??;

    if reply.is_ack() {
        return Ok(());
    }

    match reply {
        AgentReply::LoggingStatus { .. } => {
            Err(LoghubError::delivery(agent.id(), "logging start not ok"))
        }
        AgentReply::Error { message } => Err(LoghubError::delivery(
            agent.id(),
            format!("logging start failed: {}", message),
        )),
        AgentReply::Other => Err(LoghubError::delivery(
            agent.id(),
            "unexpected reply to logging start",
        )),
    }
}

/// Delivers an assignment to its collector.
///
/// A push failure is returned. A start-phase failure is logged and reported
/// as [`StartAck::Failed`]; the push still counts as delivered and nothing is
/// retried here.
pub async fn deliver(
    agent: &dyn Collector,
    assignment: &Assignment,
    report: &str,
    ack_timeout: Duration,
) -> Result<StartAck> {
    push(agent, assignment, report).await?;
    debug!(project_id = assignment.id, agent = %agent.id(), "Logging config delivered");

    if !assignment.started {
        return Ok(StartAck::NotRequested);
    }

    match request_start(agent, assignment.id, ack_timeout).await {
        Ok(()) => {
            info!(project_id = assignment.id, agent = %agent.id(), "Logging start acknowledged");
            Ok(StartAck::Confirmed)
        }
        Err(err) => {
            error!(
                project_id = assignment.id,
                agent = %agent.id(),
                error = %err,
                "Logging start was not acknowledged"
            );
            Ok(StartAck::Failed(err.to_string()))
        }
    }
}

/// Pushes the assignment's configuration to every agent in the pool.
///
/// Per-agent failures are logged and skipped. Returns the collector id to
/// record, which is always empty since no single agent owns the project.
pub async fn broadcast(pool: &dyn AgentPool, assignment: &Assignment, report: &str) -> String {
    let agents = pool.all();
    let mut delivered = 0usize;

    for agent in &agents {
        match push(agent.as_ref(), assignment, report).await {
            Ok(()) => delivered += 1,
            Err(err) => {
                error!(
                    project_id = assignment.id,
                    agent = %agent.id(),
                    error = %err,
                    "Broadcast of file logging config failed"
                );
            }
        }
    }

    info!(
        project_id = assignment.id,
        delivered,
        agents = agents.len(),
        "File logging config broadcast"
    );
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{pool_with, MockCollector, StartBehavior};
    use crate::logconf::args::{CollectMode, ConfigArgs, FileConfig, K8sConfig};

    const ACK: Duration = Duration::from_millis(100);

    fn k8s_assignment(started: bool) -> Assignment {
        Assignment {
            id: 3,
            args: ConfigArgs {
                exclude: String::new(),
                batch: 1000,
                buffer: 4096,
                interval: 30,
                mode: CollectMode::K8s(K8sConfig {
                    namespace: "prod".to_string(),
                    names: vec![],
                    dir: "/var/log/pods".to_string(),
                    api: String::new(),
                    token: String::new(),
                }),
            },
            cid: "prod-k8s-a".to_string(),
            started,
        }
    }

    fn file_assignment() -> Assignment {
        Assignment {
            id: 7,
            args: ConfigArgs {
                mode: CollectMode::File(FileConfig {
                    dir: "/var/log/app".to_string(),
                }),
                ..k8s_assignment(false).args
            },
            cid: String::new(),
            started: false,
        }
    }

    #[tokio::test]
    async fn test_not_started_skips_start_phase() {
        let agent = MockCollector::new("prod-k8s-a");

        let ack = deliver(&agent, &k8s_assignment(false), "http://hub/report", ACK)
            .await
            .unwrap();

        assert_eq!(ack, StartAck::NotRequested);
        assert_eq!(agent.pushes().len(), 1);
        assert_eq!(agent.pushes()[0].report, "http://hub/report");
        assert!(agent.starts().is_empty());
    }

    #[tokio::test]
    async fn test_started_is_acknowledged() {
        let agent = MockCollector::new("prod-k8s-a");

        let ack = deliver(&agent, &k8s_assignment(true), "", ACK).await.unwrap();

        assert_eq!(ack, StartAck::Confirmed);
        assert_eq!(agent.starts(), vec![3]);
    }

    #[tokio::test]
    async fn test_start_failures_do_not_fail_delivery() {
        let behaviors = [
            StartBehavior::Reply(AgentReply::LoggingStatus { ok: false }),
            StartBehavior::Reply(AgentReply::Error {
                message: "boom".to_string(),
            }),
            StartBehavior::Reply(AgentReply::Other),
            StartBehavior::Fail,
            StartBehavior::Hang,
        ];

        for behavior in behaviors {
            let agent = MockCollector::new("prod-k8s-a").on_start(behavior.clone());
            let ack = deliver(&agent, &k8s_assignment(true), "", ACK).await.unwrap();

            assert!(
                matches!(ack, StartAck::Failed(_)),
                "{:?} should fail the start phase",
                behavior
            );
            assert_eq!(agent.pushes().len(), 1);
            assert_eq!(agent.starts(), vec![3], "no retry within one delivery");
        }
    }

    #[tokio::test]
    async fn test_push_failure_is_returned() {
        let agent = MockCollector::new("prod-k8s-a").failing();

        let result = deliver(&agent, &k8s_assignment(true), "", ACK).await;

        assert!(matches!(result, Err(LoghubError::Delivery { .. })));
        assert!(agent.starts().is_empty());
    }

    #[tokio::test]
    async fn test_request_start_timeout() {
        let agent = MockCollector::new("prod-k8s-a").on_start(StartBehavior::Hang);

        let err = request_start(&agent, 3, ACK).await.unwrap_err();
        assert!(matches!(err, LoghubError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_request_start_needs_ok_status() {
        let agent = MockCollector::new("prod-k8s-a");
        tokio_test::assert_ok!(request_start(&agent, 3, ACK).await);

        let agent = MockCollector::new("prod-k8s-a")
            .on_start(StartBehavior::Reply(AgentReply::LoggingStatus { ok: false }));
        let err = request_start(&agent, 3, ACK).await.unwrap_err();
        assert!(err.to_string().contains("logging start not ok"));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_agent() {
        let (pool, agents) = pool_with(vec![
            MockCollector::new("node-1"),
            MockCollector::new("node-2"),
        ]);

        let cid = broadcast(pool.as_ref(), &file_assignment(), "r").await;

        assert_eq!(cid, "");
        for agent in &agents {
            assert_eq!(agent.pushes().len(), 1);
            assert!(agent.starts().is_empty());
        }
    }

    #[tokio::test]
    async fn test_broadcast_succeeds_when_every_send_fails() {
        let (pool, agents) = pool_with(vec![
            MockCollector::new("node-1").failing(),
            MockCollector::new("node-2").failing(),
        ]);

        let cid = broadcast(pool.as_ref(), &file_assignment(), "r").await;

        assert_eq!(cid, "");
        assert!(agents.iter().all(|a| a.pushes().is_empty()));
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_pool() {
        let (pool, _) = pool_with(vec![]);
        assert_eq!(broadcast(pool.as_ref(), &file_assignment(), "r").await, "");
    }
}
