use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{AgentKind, DecisionRecord};

/// The decision records of one pipeline run for one ticket.
#[derive(Debug, Clone)]
pub struct DecisionBatch {
    pub ticket_id: String,
    pub records: Vec<DecisionRecord>,
}

/// A persisted decision log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    /// Assigned by the store; 0 before insertion.
    pub id: i64,
    pub ticket_id: String,
    pub agent: AgentKind,
    pub decision: String,
    pub confidence: f64,
    pub explanation: String,
    pub timestamp: DateTime<Utc>,
}

impl DecisionLogEntry {
    pub fn from_record(ticket_id: &str, record: &DecisionRecord) -> Self {
        Self {
            id: 0,
            ticket_id: ticket_id.to_string(),
            agent: record.agent,
            decision: record.decision.clone(),
            confidence: record.confidence,
            explanation: record.explanation.clone(),
            timestamp: record.timestamp,
        }
    }
}
