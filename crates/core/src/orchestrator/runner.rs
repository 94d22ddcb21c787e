//! Ticket orchestrator implementation.
//!
//! Connects the ticket store to the triage pipeline:
//! - Submission: create the ticket, then process it in the background
//! - Processing: bounded by `process_timeout_ms`, persistence included
//! - Recovery: failed runs reset the ticket to `Received`

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::metrics;
use crate::pipeline::{ProcessTicketRequest, TriagePipeline};
use crate::ticket::{CreateTicketRequest, Ticket, TicketStatus, TicketStore};

use super::config::OrchestratorConfig;
use super::types::OrchestratorError;

/// Callback invoked with the ticket id and new status after a status change
/// is persisted.
pub type TicketUpdateCallback = Arc<dyn Fn(&str, TicketStatus) + Send + Sync>;

/// The ticket orchestrator - drives tickets through the triage pipeline.
pub struct TicketOrchestrator {
    config: OrchestratorConfig,
    ticket_store: Arc<dyn TicketStore>,
    pipeline: TriagePipeline,
    update_callback: Option<TicketUpdateCallback>,
}

impl TicketOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        ticket_store: Arc<dyn TicketStore>,
        pipeline: TriagePipeline,
    ) -> Self {
        Self {
            config,
            ticket_store,
            pipeline,
            update_callback: None,
        }
    }

    /// Set a callback to be notified of ticket status changes.
    pub fn with_update_callback(mut self, callback: TicketUpdateCallback) -> Self {
        self.update_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &TriagePipeline {
        &self.pipeline
    }

    pub fn ticket_store(&self) -> &Arc<dyn TicketStore> {
        &self.ticket_store
    }

    /// Create a ticket in `Received` and process it on a background task.
    ///
    /// Returns as soon as the ticket is stored; the outcome of processing is
    /// only visible through the store.
    pub fn submit(
        self: &Arc<Self>,
        request: CreateTicketRequest,
    ) -> Result<Ticket, OrchestratorError> {
        let ticket = self.ticket_store.create(request)?;
        info!(ticket_id = %ticket.id, "Ticket created");

        let orchestrator = Arc::clone(self);
        let ticket_id = ticket.id.clone();
        tokio::spawn(async move {
            // Failures are logged and recovered inside process_ticket
            let _ = orchestrator.process_ticket(&ticket_id).await;
        });

        Ok(ticket)
    }

    /// Run the pipeline on a stored ticket and persist the outcome.
    ///
    /// On failure the ticket is put back in `Received` and the error is
    /// returned. A missing ticket is reported without touching the store.
    pub async fn process_ticket(&self, ticket_id: &str) -> Result<Ticket, OrchestratorError> {
        let ticket = self
            .ticket_store
            .get(ticket_id)?
            .ok_or_else(|| OrchestratorError::TicketNotFound(ticket_id.to_string()))?;

        let timeout = self.config.process_timeout();
        let result = match tokio::time::timeout(timeout, self.run_and_persist(&ticket)).await {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::Timeout(self.config.process_timeout_ms)),
        };

        match result {
            Ok(updated) => {
                info!(
                    ticket_id = %ticket_id,
                    status = %updated.status,
                    "Ticket processed"
                );
                self.notify(ticket_id, updated.status);
                Ok(updated)
            }
            Err(e) => {
                metrics::PROCESSING_FAILURES
                    .with_label_values(&[e.reason()])
                    .inc();
                error!(ticket_id = %ticket_id, "Ticket processing failed: {}", e);
                self.reset_to_received(ticket_id);
                Err(e)
            }
        }
    }

    /// Process a stored ticket again and return it as it is afterwards.
    ///
    /// Processing failures are not returned; the refreshed ticket shows
    /// them as `Received`.
    pub async fn reprocess(&self, ticket_id: &str) -> Result<Ticket, OrchestratorError> {
        info!(ticket_id = %ticket_id, "Reprocessing ticket");

        match self.process_ticket(ticket_id).await {
            Ok(ticket) => Ok(ticket),
            Err(e @ OrchestratorError::TicketNotFound(_)) => Err(e),
            Err(e) => {
                warn!(ticket_id = %ticket_id, "Reprocessing failed: {}", e);
                self.ticket_store
                    .get(ticket_id)?
                    .ok_or_else(|| OrchestratorError::TicketNotFound(ticket_id.to_string()))
            }
        }
    }

    /// Manually override a ticket's status.
    pub fn update_status(
        &self,
        ticket_id: &str,
        status: TicketStatus,
    ) -> Result<Ticket, OrchestratorError> {
        let ticket = self
            .ticket_store
            .update_status(ticket_id, status)
            .map_err(|e| match e {
                crate::ticket::TicketError::NotFound(id) => OrchestratorError::TicketNotFound(id),
                other => OrchestratorError::TicketStore(other),
            })?;
        info!(ticket_id = %ticket_id, status = %status, "Ticket status overridden");
        self.notify(ticket_id, status);
        Ok(ticket)
    }

    async fn run_and_persist(&self, ticket: &Ticket) -> Result<Ticket, OrchestratorError> {
        let request = ProcessTicketRequest::new(ticket.title.clone(), ticket.description.clone())
            .with_ticket_id(ticket.id.clone());
        let outcome = self.pipeline.process(&request).await?;
        Ok(self.ticket_store.apply_outcome(&ticket.id, &outcome)?)
    }

    fn reset_to_received(&self, ticket_id: &str) {
        match self
            .ticket_store
            .update_status(ticket_id, TicketStatus::Received)
        {
            Ok(_) => self.notify(ticket_id, TicketStatus::Received),
            Err(e) => error!(ticket_id = %ticket_id, "Failed to reset ticket status: {}", e),
        }
    }

    fn notify(&self, ticket_id: &str, status: TicketStatus) {
        if let Some(ref callback) = self.update_callback {
            callback(ticket_id, status);
        }
    }
}
