//! Ticket orchestrator.
//!
//! Owns the ticket store and the triage pipeline and drives a ticket from
//! `Received` to its derived status:
//! - **Submit**: persist the ticket, then process it on a background task
//! - **Process**: run the pipeline under a time bound and persist the outcome
//! - **Recover**: any failure puts the ticket back in `Received` so it can be
//!   reprocessed

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::{TicketOrchestrator, TicketUpdateCallback};
pub use types::OrchestratorError;
