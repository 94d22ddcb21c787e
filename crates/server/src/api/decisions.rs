use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::{
    agents::AgentKind,
    decision_log::{DecisionLogEntry, DecisionLogFilter},
};

use super::{error_response, internal_error, ApiError};
use crate::state::AppState;

/// Maximum allowed limit for decision log queries
const MAX_LIMIT: i64 = 1000;

/// Query parameters for the decision log endpoint
#[derive(Debug, Deserialize)]
pub struct DecisionQueryParams {
    /// Filter by ticket ID
    pub ticket_id: Option<String>,
    /// Filter by agent (`Classifier`, `RiskEvaluator`, `Resolution`, `Escalation`)
    pub agent: Option<String>,
    /// Maximum number of entries to return (max 1000). Defaults to 100,
    /// or to the whole history when `ticket_id` is set.
    pub limit: Option<i64>,
    /// Pagination offset (default 0)
    pub offset: Option<i64>,
}

/// Response for the decision log endpoint
#[derive(Debug, Serialize)]
pub struct DecisionQueryResponse {
    /// Entries, newest first
    pub decisions: Vec<DecisionLogEntry>,
    /// Total number of matching entries
    pub total: i64,
    /// Applied cap, null when the ticket's history is returned whole
    pub limit: Option<i64>,
    pub offset: i64,
}

/// Query the decision log
pub async fn query_decisions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DecisionQueryParams>,
) -> Result<Json<DecisionQueryResponse>, ApiError> {
    let offset = params.offset.unwrap_or(0).max(0);

    // Base filter is shared between query and count
    let mut base_filter = DecisionLogFilter::new();

    if let Some(ref ticket_id) = params.ticket_id {
        base_filter = base_filter.with_ticket_id(ticket_id);
    }

    if let Some(ref agent) = params.agent {
        let agent = agent
            .parse::<AgentKind>()
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))?;
        base_filter = base_filter.with_agent(agent);
    }

    let mut query_filter = base_filter.clone().with_offset(offset);
    if let Some(limit) = params.limit {
        query_filter = query_filter.with_limit(limit.clamp(1, MAX_LIMIT));
    }
    let limit = query_filter.effective_limit();

    let decisions = state
        .decision_log_store()
        .query(&query_filter)
        .map_err(|e| internal_error("Failed to query decision log.", e))?;

    let total = state
        .decision_log_store()
        .count(&base_filter)
        .map_err(|e| internal_error("Failed to count decision log entries.", e))?;

    Ok(Json(DecisionQueryResponse {
        decisions,
        total,
        limit,
        offset,
    }))
}
