//! Durable per-project assignment records.
//!
//! Each project has one JSON record at `<data_dir>/logging/<project_id>.json`
//! holding its last distributed configuration. Records are overwritten in
//! place; no history is kept.

use crate::error::{LoghubError, Result};
use crate::logconf::args::{CollectMode, ConfigArgs};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Subdirectory of the data directory holding assignment records.
pub const LOGGING_DIR: &str = "logging";

/// The configuration bound to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Project id.
    pub id: i64,
    /// Logging configuration.
    pub args: ConfigArgs,
    /// Owning collector; empty for broadcast modes.
    #[serde(default)]
    pub cid: String,
    /// Whether collection is running for the project.
    #[serde(default)]
    pub started: bool,
}

impl Assignment {
    /// Returns true when a single collector owns this project.
    pub fn has_collector(&self) -> bool {
        matches!(self.args.mode, CollectMode::K8s(_)) && !self.cid.is_empty()
    }
}

/// File-backed assignment store.
#[derive(Debug, Clone)]
pub struct AssignmentStore {
    dir: PathBuf,
}

impl AssignmentStore {
    /// Creates a store rooted at `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join(LOGGING_DIR),
        }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a project's record.
    pub fn record_path(&self, project_id: i64) -> PathBuf {
        self.dir.join(format!("{}.json", project_id))
    }

    /// Writes the full assignment, replacing any previous record.
    pub async fn save(&self, assignment: &Assignment) -> Result<()> {
        let path = self.record_path(assignment.id);

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| LoghubError::persistence(&self.dir, e))?;

        let mut body =
            serde_json::to_vec(assignment).map_err(|e| LoghubError::persistence(&path, e))?;
        body.push(b'\n');

        fs::write(&path, body)
            .await
            .map_err(|e| LoghubError::persistence(&path, e))?;

        debug!(project_id = assignment.id, path = %path.display(), "Assignment saved");
        Ok(())
    }

    /// Reads one project's record.
    #[cfg(test)]
    pub async fn load(&self, project_id: i64) -> Result<Option<Assignment>> {
        let path = self.record_path(project_id);
        match fs::read(&path).await {
            Ok(body) => serde_json::from_slice(&body)
                .map(Some)
                .map_err(|e| LoghubError::persistence(&path, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LoghubError::persistence(&path, e)),
        }
    }

    /// Reads every record, ordered by project id.
    ///
    /// A missing directory means no records. Unreadable or malformed records
    /// are skipped with a warning.
    pub async fn load_all(&self) -> Result<Vec<Assignment>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LoghubError::persistence(&self.dir, e)),
        };

        let mut assignments = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LoghubError::persistence(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let body = match fs::read(&path).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable assignment");
                    continue;
                }
            };
            match serde_json::from_slice::<Assignment>(&body) {
                Ok(assignment) => assignments.push(assignment),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed assignment");
                }
            }
        }

        assignments.sort_by_key(|a| a.id);
        Ok(assignments)
    }
}
