//! Knowledge lookup types.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A knowledge base article as returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeArticle {
    pub title: String,
    /// Article body. Remote services may omit it or send `null`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl KnowledgeArticle {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Request to add an article to the local store.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Errors that can occur during a knowledge lookup.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Knowledge service connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Knowledge service API error: {0}")]
    Api(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for KnowledgeError {
    fn from(e: rusqlite::Error) -> Self {
        KnowledgeError::Database(e.to_string())
    }
}

/// A source of knowledge base articles for the resolver.
///
/// Implementations only read. An empty result is a normal outcome.
#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    /// Backend name for logging and metrics.
    fn name(&self) -> &str;

    /// Search articles matching `query`, best match first.
    async fn search(&self, query: &str) -> Result<Vec<KnowledgeArticle>, KnowledgeError>;
}
