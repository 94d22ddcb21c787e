//! Pipeline request and outcome types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::{
    ClassificationResult, DecisionRecord, EscalationResult, ResolutionResult, RiskAssessment,
};
use crate::ticket::TicketStatus;

/// Errors returned by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request was rejected before any agent ran.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Input of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTicketRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// When present, decision records are forwarded to the decision log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

impl ProcessTicketRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ticket_id: None,
        }
    }

    pub fn with_ticket_id(mut self, ticket_id: impl Into<String>) -> Self {
        self.ticket_id = Some(ticket_id.into());
        self
    }
}

/// Everything one pipeline run decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketOutcome {
    #[serde(rename = "classifier")]
    pub classification: ClassificationResult,
    pub risk: RiskAssessment,
    pub resolution: ResolutionResult,
    pub escalation: EscalationResult,
    pub status: TicketStatus,
    /// One record per agent, in pipeline order.
    pub decision_records: Vec<DecisionRecord>,
}
