//! HTTP knowledge service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::HttpKnowledgeConfig;

use super::{KnowledgeArticle, KnowledgeError, KnowledgeLookup};

/// Client for a remote knowledge service exposing `GET /search?q=`.
pub struct HttpKnowledgeClient {
    client: Client,
    base_url: String,
}

impl HttpKnowledgeClient {
    /// Create a client with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, KnowledgeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KnowledgeError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &HttpKnowledgeConfig) -> Result<Self, KnowledgeError> {
        Self::new(
            config.url.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    fn build_search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl KnowledgeLookup for HttpKnowledgeClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn search(&self, query: &str) -> Result<Vec<KnowledgeArticle>, KnowledgeError> {
        let url = self.build_search_url(query);
        debug!(url = %url, "Querying knowledge service");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                KnowledgeError::Timeout
            } else if e.is_connect() {
                KnowledgeError::ConnectionFailed(e.to_string())
            } else {
                KnowledgeError::Api(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KnowledgeError::Api(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let articles: Vec<KnowledgeArticle> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                KnowledgeError::Timeout
            } else {
                KnowledgeError::Api(format!("Failed to parse response: {}", e))
            }
        })?;

        debug!(results = articles.len(), "Knowledge search complete");
        Ok(articles)
    }
}
