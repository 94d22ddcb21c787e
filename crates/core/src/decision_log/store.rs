use thiserror::Error;

use crate::agents::AgentKind;
use crate::health::HealthCheck;

use super::DecisionLogEntry;

#[derive(Debug, Error)]
pub enum DecisionLogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid stored value: {0}")]
    Corrupt(String),
}

/// Filter for querying the decision log
#[derive(Debug, Clone, Default)]
pub struct DecisionLogFilter {
    pub ticket_id: Option<String>,
    pub agent: Option<AgentKind>,
    /// Explicit cap. When unset, a ticket's history is returned whole and
    /// other queries get the most recent [`DEFAULT_DECISION_LIMIT`].
    pub limit: Option<i64>,
    pub offset: i64,
}

/// Cap of an unfiltered decision log query.
pub const DEFAULT_DECISION_LIMIT: i64 = 100;

impl DecisionLogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The row cap to apply, `None` meaning unbounded.
    pub fn effective_limit(&self) -> Option<i64> {
        match (self.limit, &self.ticket_id) {
            (Some(limit), _) => Some(limit),
            (None, Some(_)) => None,
            (None, None) => Some(DEFAULT_DECISION_LIMIT),
        }
    }

    pub fn with_ticket_id(mut self, ticket_id: impl Into<String>) -> Self {
        self.ticket_id = Some(ticket_id.into());
        self
    }

    pub fn with_agent(mut self, agent: AgentKind) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for decision log storage
pub trait DecisionLogStore: HealthCheck + Send + Sync {
    /// Append an entry, returns the assigned ID
    fn insert(&self, entry: &DecisionLogEntry) -> Result<i64, DecisionLogError>;

    /// Query entries, newest first
    fn query(&self, filter: &DecisionLogFilter) -> Result<Vec<DecisionLogEntry>, DecisionLogError>;

    /// Count matching entries
    fn count(&self, filter: &DecisionLogFilter) -> Result<i64, DecisionLogError>;
}
