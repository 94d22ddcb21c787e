//! Data types shared by the decision agents.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Ticket input
// ============================================================================

/// Immutable ticket text fed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketText {
    pub title: String,
    pub description: String,
}

impl TicketText {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Title and description joined by a single space, original casing.
    pub fn raw_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Lower-cased `raw_text`, the form every keyword rule matches against.
    pub fn combined_text(&self) -> String {
        self.raw_text().to_lowercase()
    }
}

// ============================================================================
// Classification enums
// ============================================================================

/// Ticket category assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Account,
    Security,
    Billing,
    Technical,
    #[serde(rename = "Feature Request")]
    FeatureRequest,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Security => "Security",
            Self::Billing => "Billing",
            Self::Technical => "Technical",
            Self::FeatureRequest => "Feature Request",
            Self::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Account" => Ok(Self::Account),
            "Security" => Ok(Self::Security),
            "Billing" => Ok(Self::Billing),
            "Technical" => Ok(Self::Technical),
            "Feature Request" => Ok(Self::FeatureRequest),
            "General" => Ok(Self::General),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Urgency of a ticket. Independent of risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Estimated harm from mishandling a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown risk level: {}", other)),
        }
    }
}

// ============================================================================
// Agent results
// ============================================================================

/// Which keyword tier produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationReason {
    RoutineMatch,
    HighPriorityMatch,
    MediumPriorityMatch,
    NoMatch,
}

/// Output of the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub category: Category,
    pub priority: Priority,
    pub confidence: f64,
    pub is_routine_issue: bool,
    pub explanation: String,
    pub reason_code: ClassificationReason,
    /// Keyword that triggered the match, absent for the default result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
}

/// Which rule of the risk decision list fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskReason {
    HighRiskIndicator,
    FinancialTransaction,
    SecurityHighPriority,
    RoutineIssue,
    NonRoutineClassified,
    LowConfidence,
    Default,
}

/// Output of the risk evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_reasoning: String,
    pub reason_code: RiskReason,
}

/// Which resolver path produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionReason {
    RoutineFallback,
    RoutineGenericFallback,
    KnowledgeArticle,
    LowConfidence,
    NoMatch,
}

/// What happened to the knowledge lookup during a resolution.
///
/// Only used for observability; the resolver treats every outcome other
/// than `Found` identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeLookupOutcome {
    /// Routine path; the lookup is never consulted.
    NotAttempted,
    /// No lookup collaborator configured.
    NotConfigured,
    Found,
    NoResults,
    Unavailable,
    TimedOut,
}

impl KnowledgeLookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAttempted => "not_attempted",
            Self::NotConfigured => "not_configured",
            Self::Found => "found",
            Self::NoResults => "no_results",
            Self::Unavailable => "unavailable",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Output of the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub can_resolve: bool,
    pub confidence: f64,
    /// Empty when the ticket cannot be resolved.
    pub resolution_steps: String,
    pub used_fallback: bool,
    pub reasoning: String,
    pub reason_code: ResolutionReason,
    pub knowledge_lookup: KnowledgeLookupOutcome,
}

/// A single escalation trigger. Declaration order is reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTrigger {
    HighRisk,
    LowClassificationConfidence,
    LowResolutionConfidence,
    NonRoutineUnresolved,
}

impl EscalationTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighRisk => "high_risk",
            Self::LowClassificationConfidence => "low_classification_confidence",
            Self::LowResolutionConfidence => "low_resolution_confidence",
            Self::NonRoutineUnresolved => "non_routine_unresolved",
        }
    }
}

/// Output of the escalator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationResult {
    pub escalate: bool,
    /// Semicolon-joined reasons of every trigger that fired.
    pub escalation_reason: String,
    pub explanation: String,
    pub triggers: Vec<EscalationTrigger>,
}

// ============================================================================
// Decision records
// ============================================================================

/// The agent that produced a decision record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Classifier,
    RiskEvaluator,
    Resolution,
    Escalation,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classifier => "Classifier",
            Self::RiskEvaluator => "RiskEvaluator",
            Self::Resolution => "Resolution",
            Self::Escalation => "Escalation",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Classifier" => Ok(Self::Classifier),
            "RiskEvaluator" => Ok(Self::RiskEvaluator),
            "Resolution" => Ok(Self::Resolution),
            "Escalation" => Ok(Self::Escalation),
            other => Err(format!("unknown agent: {}", other)),
        }
    }
}

/// One agent's decision in a pipeline run. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub agent: AgentKind,
    pub decision: String,
    pub confidence: f64,
    pub explanation: String,
    pub timestamp: DateTime<Utc>,
}
