//! Decision records summarising one pipeline run, one per agent.

use chrono::{DateTime, Utc};

use super::types::{
    AgentKind, ClassificationResult, DecisionRecord, EscalationResult, ResolutionResult,
    RiskAssessment,
};

/// Fixed confidence reported for the risk evaluator's decision.
pub const RISK_DECISION_CONFIDENCE: f64 = 0.85;
/// Confidence reported when escalating.
pub const ESCALATE_DECISION_CONFIDENCE: f64 = 0.9;
/// Confidence reported when not escalating.
pub const NO_ESCALATION_DECISION_CONFIDENCE: f64 = 0.7;

/// Build the four decision records of a run, all stamped with `timestamp`.
pub fn build_decision_records(
    classification: &ClassificationResult,
    risk: &RiskAssessment,
    resolution: &ResolutionResult,
    escalation: &EscalationResult,
    timestamp: DateTime<Utc>,
) -> Vec<DecisionRecord> {
    let classifier_decision = format!(
        "{} - {} priority{}",
        classification.category,
        classification.priority,
        if classification.is_routine_issue {
            " (Routine)"
        } else {
            ""
        }
    );

    let resolution_decision = match (resolution.can_resolve, resolution.used_fallback) {
        (true, true) => "Can Auto-Resolve (Fallback)",
        (true, false) => "Can Auto-Resolve",
        (false, _) => "Cannot Auto-Resolve",
    };

    let (escalation_decision, escalation_confidence) = if escalation.escalate {
        ("Escalate to Human", ESCALATE_DECISION_CONFIDENCE)
    } else {
        ("No Escalation Needed", NO_ESCALATION_DECISION_CONFIDENCE)
    };

    vec![
        DecisionRecord {
            agent: AgentKind::Classifier,
            decision: classifier_decision,
            confidence: classification.confidence,
            explanation: classification.explanation.clone(),
            timestamp,
        },
        DecisionRecord {
            agent: AgentKind::RiskEvaluator,
            decision: format!("Risk Level: {}", risk.risk_level),
            confidence: RISK_DECISION_CONFIDENCE,
            explanation: risk.risk_reasoning.clone(),
            timestamp,
        },
        DecisionRecord {
            agent: AgentKind::Resolution,
            decision: resolution_decision.to_string(),
            confidence: resolution.confidence,
            explanation: resolution.reasoning.clone(),
            timestamp,
        },
        DecisionRecord {
            agent: AgentKind::Escalation,
            decision: escalation_decision.to_string(),
            confidence: escalation_confidence,
            explanation: escalation.explanation.clone(),
            timestamp,
        },
    ]
}
