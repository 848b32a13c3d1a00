//! Collector agent registry entries.

use serde::{Deserialize, Serialize};

/// A collector agent reachable over HTTP.
///
/// The id carries the grouping convention used for clustered collection:
/// `<namespace>-k8s-<suffix>` for namespace-bound collectors and
/// `k8s-<suffix>` for the shared pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEndpoint {
    /// Agent identity.
    pub id: String,

    /// Base URL of the agent (e.g., "http://10.0.0.11:7000").
    pub address: String,

    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}
