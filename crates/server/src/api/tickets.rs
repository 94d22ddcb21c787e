//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::{
    ticket::{CreateTicketRequest, TicketFilter},
    CollaboratorHealth, HealthCheck, OrchestratorError, Ticket, TicketStatus,
};

use super::{error_response, internal_error, ApiError};
use crate::metrics::{TICKETS_CREATED_TOTAL, TICKET_STATUS_OVERRIDES};
use crate::state::AppState;

/// Maximum allowed limit for ticket queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for ticket queries
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// Filter by status (`Received`, `auto_resolved`, ...)
    pub status: Option<String>,
    /// Maximum number of tickets to return
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

/// Request body for a manual status override
#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<Ticket>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct ReprocessResponse {
    pub message: String,
    pub ticket: Ticket,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatusResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_backend: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a ticket and start processing it in the background
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    // Stored as sent; trimming only decides whether a field is blank
    let (title, description) = match (body.title, body.description) {
        (Some(title), Some(description))
            if !title.trim().is_empty() && !description.trim().is_empty() =>
        {
            (title, description)
        }
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Title and description are required.",
            ))
        }
    };

    let request = CreateTicketRequest { title, description };

    match state.orchestrator().submit(request) {
        Ok(ticket) => {
            TICKETS_CREATED_TOTAL.inc();
            Ok((StatusCode::CREATED, Json(ticket)))
        }
        Err(e) => Err(internal_error("Failed to create ticket.", e)),
    }
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    match state.ticket_store().get(&id) {
        Ok(Some(ticket)) => Ok(Json(ticket)),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "Ticket not found.")),
        Err(e) => Err(internal_error("Failed to fetch ticket.", e)),
    }
}

/// List tickets, newest first
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = TicketFilter::new().with_limit(limit).with_offset(offset);

    if let Some(ref status) = params.status {
        match status.parse::<TicketStatus>() {
            Ok(status) => filter = filter.with_status(status),
            Err(e) => return Err(error_response(StatusCode::BAD_REQUEST, e)),
        }
    }

    let tickets = state
        .ticket_store()
        .list(&filter)
        .map_err(|e| internal_error("Failed to list tickets.", e))?;

    // Total count ignores pagination
    let count_filter = TicketFilter {
        limit: i64::MAX,
        offset: 0,
        ..filter.clone()
    };
    let total = state
        .ticket_store()
        .count(&count_filter)
        .map_err(|e| internal_error("Failed to count tickets.", e))?;

    Ok(Json(ListTicketsResponse {
        tickets,
        total,
        limit,
        offset,
    }))
}

/// Manually override a ticket's status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<Ticket>, ApiError> {
    let status = body
        .status
        .parse::<TicketStatus>()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))?;

    match state.orchestrator().update_status(&id, status) {
        Ok(ticket) => {
            TICKET_STATUS_OVERRIDES
                .with_label_values(&[status.as_str()])
                .inc();
            Ok(Json(ticket))
        }
        Err(OrchestratorError::TicketNotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, "Ticket not found."))
        }
        Err(e) => Err(internal_error("Failed to update ticket status.", e)),
    }
}

/// Run the pipeline again and return the refreshed ticket
pub async fn reprocess_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ReprocessResponse>, ApiError> {
    match state.orchestrator().reprocess(&id).await {
        Ok(ticket) => Ok(Json(ReprocessResponse {
            message: "Ticket reprocessing initiated".to_string(),
            ticket,
        })),
        Err(OrchestratorError::TicketNotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, "Ticket not found."))
        }
        Err(e) => Err(internal_error("Failed to reprocess ticket.", e)),
    }
}

/// Whether the agent pipeline can currently process tickets
pub async fn agent_status(State(state): State<Arc<AppState>>) -> Json<AgentStatusResponse> {
    let knowledge_backend = state
        .pipeline()
        .resolver()
        .knowledge_backend()
        .map(str::to_string);

    let response = match state.ticket_store().health() {
        CollaboratorHealth::Disconnected => AgentStatusResponse {
            status: "not_connected".to_string(),
            message: "Agent orchestrator service is not accessible. Make sure it is running."
                .to_string(),
            knowledge_backend,
        },
        _ => AgentStatusResponse {
            status: "connected".to_string(),
            message: "Agent orchestrator service is running".to_string(),
            knowledge_backend,
        },
    };

    Json(response)
}
