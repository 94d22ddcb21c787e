//! Core ticket data types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{Category, DecisionRecord, Priority, RiskLevel};

/// Lifecycle status of a ticket.
///
/// ```text
/// Received ──pipeline──► auto_resolved | escalated | awaiting_clarification
///     ▲                          │
///     └──── processing failed ───┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Not yet processed, or processing failed and can be retried.
    #[default]
    Received,
    #[serde(rename = "auto_resolved")]
    AutoResolved,
    #[serde(rename = "escalated")]
    Escalated,
    #[serde(rename = "awaiting_clarification")]
    AwaitingClarification,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::AutoResolved => "auto_resolved",
            Self::Escalated => "escalated",
            Self::AwaitingClarification => "awaiting_clarification",
        }
    }

    /// All statuses, in lifecycle order.
    pub fn all() -> [TicketStatus; 4] {
        [
            Self::Received,
            Self::AutoResolved,
            Self::Escalated,
            Self::AwaitingClarification,
        ]
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Received" => Ok(Self::Received),
            "auto_resolved" => Ok(Self::AutoResolved),
            "escalated" => Ok(Self::Escalated),
            "awaiting_clarification" => Ok(Self::AwaitingClarification),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

/// A support ticket with the outcome of its latest pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub is_routine_issue: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Decision records of every run, oldest first.
    pub agent_decisions: Vec<DecisionRecord>,
    pub resolution_steps: String,
    pub resolution_used_fallback: bool,
    pub escalation_reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// True once at least one pipeline run has been persisted.
    pub fn is_processed(&self) -> bool {
        !self.agent_decisions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        for status in TicketStatus::all() {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
        assert_eq!(TicketStatus::default(), TicketStatus::Received);
        assert!("received".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_ticket_serializes_camel_case() {
        let now = Utc::now();
        let ticket = Ticket {
            id: "t-1".to_string(),
            title: "Title".to_string(),
            description: "Description".to_string(),
            status: TicketStatus::Received,
            category: None,
            priority: None,
            is_routine_issue: false,
            risk_level: None,
            agent_decisions: vec![],
            resolution_steps: String::new(),
            resolution_used_fallback: false,
            escalation_reason: String::new(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["status"], "Received");
        assert_eq!(json["isRoutineIssue"], false);
        assert!(json.get("category").is_none());
        assert!(json["agentDecisions"].as_array().unwrap().is_empty());
        assert!(!ticket.is_processed());
    }
}
