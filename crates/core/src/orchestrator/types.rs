//! Types for the ticket orchestrator.

use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Ticket not found.
    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    /// Ticket store error.
    #[error("ticket store error: {0}")]
    TicketStore(#[from] crate::ticket::TicketError),

    /// Pipeline error.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    /// Processing did not finish within the configured bound.
    #[error("processing timed out after {0} ms")]
    Timeout(u64),
}

impl OrchestratorError {
    /// Label used for the processing failure metric.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TicketNotFound(_) => "not_found",
            Self::TicketStore(_) => "persistence",
            Self::Pipeline(_) => "pipeline",
            Self::Timeout(_) => "timeout",
        }
    }
}
