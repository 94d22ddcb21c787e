//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the ticket orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Upper bound on one processing run, persistence included (milliseconds).
    /// A run that exceeds it leaves the ticket in `Received`.
    #[serde(default = "default_process_timeout")]
    pub process_timeout_ms: u64,

    /// Capacity of the decision log channel.
    /// Records beyond it are dropped rather than slowing the pipeline.
    #[serde(default = "default_decision_log_buffer")]
    pub decision_log_buffer: usize,
}

fn default_process_timeout() -> u64 {
    10_000 // 10 seconds
}

fn default_decision_log_buffer() -> usize {
    1000
}

impl OrchestratorConfig {
    pub fn process_timeout(&self) -> Duration {
        Duration::from_millis(self.process_timeout_ms)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            process_timeout_ms: default_process_timeout(),
            decision_log_buffer: default_decision_log_buffer(),
        }
    }
}
