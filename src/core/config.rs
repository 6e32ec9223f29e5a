use crate::core::errors::{Result, SolverError};
use serde::{Deserialize, Serialize};

/// Fan-out threshold used when nothing else is configured.
pub const DEFAULT_FORK_AFTER: usize = 2;

/// Solver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// A node with more neighbors than this forks sub-searches
    pub fork_after: usize,
    /// Worker threads for `solve_blocking` (None = one per core)
    pub worker_threads: Option<usize>,
    /// Name given to runtime worker threads
    pub thread_name: String,
    /// Forward search events to the configured sink
    pub emit_events: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            fork_after: DEFAULT_FORK_AFTER,
            worker_threads: None,
            thread_name: "amazed-worker".to_string(),
            emit_events: true,
        }
    }
}

impl SolverConfig {
    /// Set the fan-out threshold
    pub fn with_fork_after(mut self, fork_after: usize) -> Self {
        self.fork_after = fork_after;
        self
    }

    /// Set the number of runtime worker threads
    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = Some(workers);
        self
    }

    /// Set the worker thread name
    pub fn with_thread_name<S: Into<String>>(mut self, name: S) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Enable or disable event emission
    pub fn with_events(mut self, enabled: bool) -> Self {
        self.emit_events = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(SolverError::configuration_field(
                "worker_threads must be greater than 0",
                "worker_threads",
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(SolverError::configuration_field(
                "thread_name cannot be empty",
                "thread_name",
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
