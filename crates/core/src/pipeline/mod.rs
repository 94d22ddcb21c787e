//! The triage pipeline.
//!
//! Runs the four agents in a fixed order on one ticket and derives the
//! resulting ticket status:
//!
//! ```text
//! Classifier ──► Risk Evaluator ──► Resolver ──► Escalator ──► status
//!                                      │
//!                              knowledge lookup (bounded)
//! ```
//!
//! A run shares no mutable state with other runs. When a ticket id is
//! supplied, the decision records of the run are forwarded to the decision
//! log without waiting for the write.

mod runner;
mod types;

pub use runner::{derive_status, TriagePipeline};
pub use types::{PipelineError, ProcessTicketRequest, TicketOutcome};
