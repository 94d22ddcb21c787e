//! Mock knowledge lookup for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::knowledge::{KnowledgeArticle, KnowledgeError, KnowledgeLookup};

/// A recorded lookup for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedLookup {
    /// The query text that was searched.
    pub query: String,
    /// When the lookup was made.
    pub timestamp: Instant,
}

/// Mock implementation of the KnowledgeLookup trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable articles
/// - Track queries for assertions
/// - Simulate failures and slow responses
///
/// # Example
///
/// ```rust,ignore
/// use triage_core::testing::MockKnowledgeLookup;
///
/// let lookup = Arc::new(MockKnowledgeLookup::new());
/// lookup.set_articles(vec![KnowledgeArticle::new("Exports", "Re-run it")]).await;
///
/// let resolver = Resolver::new(Some(lookup.clone()), Duration::from_secs(3));
/// // ...
/// assert_eq!(lookup.search_count().await, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockKnowledgeLookup {
    /// Articles returned by every successful search.
    articles: Arc<RwLock<Vec<KnowledgeArticle>>>,
    /// Recorded lookups.
    lookups: Arc<RwLock<Vec<RecordedLookup>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<KnowledgeError>>>,
    /// Artificial latency applied before answering.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockKnowledgeLookup {
    /// Create a new mock lookup that returns no articles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the articles to return for subsequent searches.
    pub async fn set_articles(&self, articles: Vec<KnowledgeArticle>) {
        *self.articles.write().await = articles;
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: KnowledgeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every search by `delay`. Use a long delay to simulate a hung service.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.lookups.read().await.len()
    }

    /// Get recorded lookups.
    pub async fn recorded_lookups(&self) -> Vec<RecordedLookup> {
        self.lookups.read().await.clone()
    }

    /// Get recorded query strings in call order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.lookups
            .read()
            .await
            .iter()
            .map(|l| l.query.clone())
            .collect()
    }
}

#[async_trait]
impl KnowledgeLookup for MockKnowledgeLookup {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<KnowledgeArticle>, KnowledgeError> {
        self.lookups.write().await.push(RecordedLookup {
            query: query.to_string(),
            timestamp: Instant::now(),
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.articles.read().await.clone())
    }
}
