//! Local knowledge base API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use triage_core::knowledge::{CreateArticleRequest, KnowledgeArticle};

use super::{error_response, internal_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticleBody {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Case-insensitive article search. An empty query returns every article.
pub async fn search_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<KnowledgeArticle>>, ApiError> {
    state
        .knowledge_store()
        .search_articles(&params.q)
        .map(Json)
        .map_err(|e| internal_error("Failed to search knowledge base.", e))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateArticleBody>,
) -> Result<(StatusCode, Json<KnowledgeArticle>), ApiError> {
    let title = body.title.as_deref().map(str::trim).unwrap_or_default();
    let content = body.content.as_deref().map(str::trim).unwrap_or_default();

    if title.is_empty() || content.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Title and content are required.",
        ));
    }

    let request = CreateArticleRequest {
        title: title.to_string(),
        content: content.to_string(),
        tags: body.tags,
    };

    match state.knowledge_store().create_article(request) {
        Ok(article) => Ok((StatusCode::CREATED, Json(article))),
        Err(e) => Err(internal_error("Failed to create article.", e)),
    }
}
