//! Agent pipeline API handlers.
//!
//! Runs the agents synchronously on a ticket body without persisting a
//! ticket. Decision records are forwarded to the decision log only when the
//! caller supplies a `ticketId`.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use triage_core::{
    ClassificationResult, EscalationResult, PipelineError, ProcessTicketRequest,
    ResolutionResult, RiskAssessment, TicketOutcome, TicketStatus,
};

use super::{error_response, internal_error, ApiError};
use crate::state::AppState;

/// Response for a pipeline run
#[derive(Debug, Serialize)]
pub struct ProcessTicketResponse {
    pub classifier: ClassificationResult,
    pub risk: RiskAssessment,
    pub resolution: ResolutionResult,
    pub escalation: EscalationResult,
    pub status: TicketStatus,
}

impl From<TicketOutcome> for ProcessTicketResponse {
    fn from(outcome: TicketOutcome) -> Self {
        Self {
            classifier: outcome.classification,
            risk: outcome.risk,
            resolution: outcome.resolution,
            escalation: outcome.escalation,
            status: outcome.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentsHealthResponse {
    pub status: String,
    pub service: String,
}

/// Run the full agent chain on a ticket body
pub async fn process_ticket(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessTicketRequest>,
) -> Result<Json<ProcessTicketResponse>, ApiError> {
    let timeout = state.orchestrator().config().process_timeout();

    match tokio::time::timeout(timeout, state.pipeline().process(&request)).await {
        Ok(Ok(outcome)) => Ok(Json(outcome.into())),
        Ok(Err(PipelineError::Validation(_))) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "Title and description required.",
        )),
        Err(_) => {
            error!(timeout_ms = timeout.as_millis() as u64, "Agent pipeline timed out");
            Err(internal_error(
                "Agent orchestration failed.",
                format!("pipeline did not finish within {}ms", timeout.as_millis()),
            ))
        }
    }
}

pub async fn health() -> Json<AgentsHealthResponse> {
    Json(AgentsHealthResponse {
        status: "ok".to_string(),
        service: "agent-orchestrator".to_string(),
    })
}
