//! Validated logging configuration for one project.

use crate::error::{LoghubError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default lines per batch.
pub const DEFAULT_BATCH: u32 = 1000;
/// Default read buffer size.
pub const DEFAULT_BUFFER: u32 = 4096;
/// Default flush interval in seconds.
pub const DEFAULT_INTERVAL: u32 = 30;
/// Default pod log directory for clustered collection.
pub const DEFAULT_K8S_DIR: &str = "/var/log/pods";

/// Configuration request as submitted by an operator.
///
/// Every field is optional at this layer so that missing values surface as
/// bad-parameter rejections rather than body decoding failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfigRequest {
    /// Project to configure.
    pub project_id: Option<i64>,
    /// Collection mode: "k8s", "docker" or "logtail".
    #[serde(rename = "type")]
    pub mode: Option<String>,
    /// Exclusion pattern.
    pub exclude: Option<String>,
    /// Lines per batch.
    pub batch: Option<u32>,
    /// Read buffer size.
    pub buffer: Option<u32>,
    /// Flush interval in seconds.
    pub interval: Option<u32>,
    /// k8s: namespace.
    pub namespace: Option<String>,
    /// k8s: selector names.
    pub names: Option<Vec<String>>,
    /// k8s: log directory; logtail: directory to tail.
    pub dir: Option<String>,
    /// k8s: API server endpoint.
    pub api: Option<String>,
    /// k8s: API token.
    pub token: Option<String>,
}

/// Clustered collection payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct K8sConfig {
    pub namespace: String,
    #[serde(default)]
    pub names: Vec<String>,
    pub dir: String,
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub token: String,
}

impl K8sConfig {
    fn build(request: &LoggingConfigRequest) -> Result<Self> {
        let namespace = non_empty(&request.namespace)
            .ok_or_else(|| LoghubError::invalid_parameter("namespace"))?;

        Ok(Self {
            namespace: namespace.to_string(),
            names: request.names.clone().unwrap_or_default(),
            dir: non_empty(&request.dir).unwrap_or(DEFAULT_K8S_DIR).to_string(),
            api: request.api.clone().unwrap_or_default(),
            token: request.token.clone().unwrap_or_default(),
        })
    }

    /// Agent id prefix of the namespace-bound collector group.
    pub fn namespace_prefix(&self) -> String {
        format!("{}-k8s-", self.namespace)
    }
}

/// File-tail collection payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    pub dir: String,
}

impl FileConfig {
    fn build(request: &LoggingConfigRequest) -> Result<Self> {
        let dir = non_empty(&request.dir).ok_or_else(|| LoghubError::invalid_parameter("dir"))?;
        Ok(Self {
            dir: dir.to_string(),
        })
    }
}

/// Collection mode with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectMode {
    /// One collector per project, chosen within the namespace group.
    K8s(K8sConfig),
    /// Every connected agent tails a local directory.
    File(FileConfig),
}

impl CollectMode {
    /// Mode name as used in requests.
    pub fn name(&self) -> &'static str {
        match self {
            CollectMode::K8s(_) => "k8s",
            CollectMode::File(_) => "logtail",
        }
    }
}

/// Logging configuration of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigArgs {
    #[serde(default)]
    pub exclude: String,
    pub batch: u32,
    pub buffer: u32,
    pub interval: u32,
    #[serde(flatten)]
    pub mode: CollectMode,
}

impl ConfigArgs {
    /// Validates a request and returns its project id with the normalized
    /// configuration.
    pub fn build(request: &LoggingConfigRequest) -> Result<(i64, Self)> {
        let project_id = request
            .project_id
            .ok_or_else(|| LoghubError::invalid_parameter("project_id"))?;

        let exclude = request.exclude.clone().unwrap_or_default();
        if !exclude.is_empty() {
            Regex::new(&exclude)
                .map_err(|e| LoghubError::invalid_parameter(format!("exclude: {}", e)))?;
        }

        let batch = positive("batch", request.batch, DEFAULT_BATCH)?;
        let buffer = positive("buffer", request.buffer, DEFAULT_BUFFER)?;
        let interval = positive("interval", request.interval, DEFAULT_INTERVAL)?;

        let mode = match request.mode.as_deref() {
            Some("k8s") => CollectMode::K8s(K8sConfig::build(request)?),
            Some("logtail") => CollectMode::File(FileConfig::build(request)?),
            Some("docker") => {
                return Err(LoghubError::UnsupportedMode {
                    mode: "docker".to_string(),
                })
            }
            _ => return Err(LoghubError::invalid_parameter("type")),
        };

        Ok((
            project_id,
            Self {
                exclude,
                batch,
                buffer,
                interval,
                mode,
            },
        ))
    }
}

fn positive(name: &str, value: Option<u32>, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(0) => Err(LoghubError::invalid_parameter(name)),
        Some(v) => Ok(v),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
