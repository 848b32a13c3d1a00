//! Agent module - the collector agents the controller distributes to.
//!
//! This module provides the `Collector` trait for a single connected agent,
//! the `AgentPool` trait the controller queries to find agents, and a
//! registry seeded from the configured agent list that agents can join at
//! runtime.

pub mod collector;
pub mod http;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::AgentEndpoint;
use crate::error::Result;
use self::http::HttpCollector;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

// Re-exports for convenience
pub use collector::{AgentReply, Collector, LoggingConfigMessage, StartLoggingMessage};

/// The set of currently connected collector agents.
///
/// Query results are ordered by agent id so that index-based selection over
/// the same agent set is reproducible.
pub trait AgentPool: Send + Sync {
    /// All agents whose id starts with `prefix`.
    fn prefix(&self, prefix: &str) -> Vec<Arc<dyn Collector>>;

    /// All agents.
    fn all(&self) -> Vec<Arc<dyn Collector>>;

    /// The agent with the given id, if connected.
    fn get(&self, id: &str) -> Option<Arc<dyn Collector>>;

    /// Number of connected agents.
    fn count(&self) -> usize {
        self.all().len()
    }

    /// Adds an agent, replacing any agent with the same id.
    fn register(&self, agent: Arc<dyn Collector>);
}

/// Agent pool keyed by agent id.
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<BTreeMap<String, Arc<dyn Collector>>>,
}

impl AgentRegistry {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds HTTP collectors for every configured endpoint.
    pub fn from_endpoints(endpoints: &[AgentEndpoint], timeout: Duration) -> Result<Self> {
        let pool = Self::new();
        for endpoint in endpoints {
            pool.register(Arc::new(HttpCollector::from_endpoint(endpoint, timeout)?));
        }
        Ok(pool)
    }

    /// Creates a pool from already-built collectors.
    pub fn from_collectors(collectors: impl IntoIterator<Item = Arc<dyn Collector>>) -> Self {
        let pool = Self::new();
        for collector in collectors {
            pool.register(collector);
        }
        pool
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<dyn Collector>>> {
        self.agents.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AgentPool for AgentRegistry {
    fn prefix(&self, prefix: &str) -> Vec<Arc<dyn Collector>> {
        self.read()
            .range(prefix.to_string()..)
            .take_while(|(id, _)| id.starts_with(prefix))
            .map(|(_, agent)| Arc::clone(agent))
            .collect()
    }

    fn all(&self) -> Vec<Arc<dyn Collector>> {
        self.read().values().cloned().collect()
    }

    fn get(&self, id: &str) -> Option<Arc<dyn Collector>> {
        self.read().get(id).cloned()
    }

    fn count(&self) -> usize {
        self.read().len()
    }

    fn register(&self, agent: Arc<dyn Collector>) {
        self.agents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(agent.id().to_string(), agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::MockCollector;

    fn ids(agents: &[Arc<dyn Collector>]) -> Vec<&str> {
        agents.iter().map(|a| a.id()).collect()
    }

    fn pool_of(names: &[&str]) -> AgentRegistry {
        AgentRegistry::from_collectors(
            names
                .iter()
                .map(|n| Arc::new(MockCollector::new(*n)) as Arc<dyn Collector>),
        )
    }

    #[test]
    fn test_prefix_query_is_sorted() {
        let pool = pool_of(&["prod-k8s-b", "k8s-x", "prod-k8s-a", "staging-k8s-a", "prod-web"]);

        assert_eq!(ids(&pool.prefix("prod-k8s-")), vec!["prod-k8s-a", "prod-k8s-b"]);
        assert_eq!(ids(&pool.prefix("k8s-")), vec!["k8s-x"]);
        assert!(pool.prefix("dev-k8s-").is_empty());
    }

    #[test]
    fn test_all_and_get() {
        let pool = pool_of(&["b", "a", "c"]);

        assert_eq!(ids(&pool.all()), vec!["a", "b", "c"]);
        assert_eq!(pool.count(), 3);
        assert_eq!(pool.get("b").map(|a| a.id().to_string()), Some("b".to_string()));
        assert!(pool.get("z").is_none());
    }

    #[test]
    fn test_from_endpoints() {
        let endpoints = vec![
            AgentEndpoint {
                id: "k8s-a".to_string(),
                address: "http://10.0.0.1:7000".to_string(),
                tags: vec![],
            },
            AgentEndpoint {
                id: "prod-k8s-a".to_string(),
                address: "http://10.0.0.2:7000".to_string(),
                tags: vec![],
            },
        ];
        let pool = AgentRegistry::from_endpoints(&endpoints, Duration::from_secs(5)).unwrap();

        assert_eq!(ids(&pool.all()), vec!["k8s-a", "prod-k8s-a"]);
    }

    #[test]
    fn test_register_replaces_same_id() {
        let pool = pool_of(&["prod-k8s-b"]);

        pool.register(Arc::new(MockCollector::new("prod-k8s-a")));
        pool.register(Arc::new(MockCollector::new("prod-k8s-b")));

        assert_eq!(pool.count(), 2);
        assert_eq!(ids(&pool.prefix("prod-k8s-")), vec!["prod-k8s-a", "prod-k8s-b"]);
    }
}
