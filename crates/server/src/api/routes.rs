use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{agents, decisions, handlers, knowledge, middleware::metrics_middleware, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Agent pipeline
        .route("/agents/process-ticket", post(agents::process_ticket))
        .route("/agents/health", get(agents::health))
        // Tickets
        .route(
            "/tickets",
            post(tickets::create_ticket).get(tickets::list_tickets),
        )
        .route("/tickets/agent-status", get(tickets::agent_status))
        .route("/tickets/{id}", get(tickets::get_ticket))
        .route("/tickets/{id}/status", patch(tickets::update_status))
        .route("/tickets/{id}/reprocess", post(tickets::reprocess_ticket))
        // Decision log
        .route("/decisions", get(decisions::query_decisions))
        // Knowledge base
        .route("/knowledge", post(knowledge::create_article))
        .route("/knowledge/search", get(knowledge::search_articles));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
