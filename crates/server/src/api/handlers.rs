use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use triage_core::{HealthCheck, SanitizedConfig};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub collaborators: CollaboratorsHealth,
}

#[derive(Serialize)]
pub struct CollaboratorsHealth {
    pub ticket_store: String,
    pub decision_log: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "triage".to_string(),
        collaborators: CollaboratorsHealth {
            ticket_store: state.ticket_store().health().as_str().to_string(),
            decision_log: state.decision_log_store().health().as_str().to_string(),
        },
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    crate::metrics::collect_dynamic_metrics(&state);
    crate::metrics::encode_metrics()
}
