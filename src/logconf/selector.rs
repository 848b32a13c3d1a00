//! Collector selection for clustered collection.

use crate::agent::{AgentPool, Collector};
use crate::error::{LoghubError, Result};
use crate::logconf::args::K8sConfig;
use std::sync::Arc;
use tracing::debug;

/// Agent id prefix of the shared collector group.
pub const SHARED_PREFIX: &str = "k8s-";

/// Picks the collector that owns a clustered project.
///
/// Namespace-bound collectors (`<namespace>-k8s-*`) are preferred, falling
/// back to the shared group (`k8s-*`). Within the group the project id,
/// taken modulo the group size, indexes the id-ordered agent list, so the
/// same project lands on the same collector while the group is unchanged.
pub fn select_collector(
    pool: &dyn AgentPool,
    project_id: i64,
    k8s: &K8sConfig,
) -> Result<Arc<dyn Collector>> {
    let mut candidates = pool.prefix(&k8s.namespace_prefix());
    if candidates.is_empty() {
        candidates = pool.prefix(SHARED_PREFIX);
    }
    if candidates.is_empty() {
        return Err(LoghubError::NoCollectorAvailable);
    }

    let index = project_id.rem_euclid(candidates.len() as i64) as usize;
    let chosen = candidates.swap_remove(index);
    debug!(
        project_id,
        namespace = %k8s.namespace,
        agent = %chosen.id(),
        "Selected collector"
    );
    Ok(chosen)
}
