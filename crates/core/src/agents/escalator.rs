//! Escalation agent.
//!
//! Escalation depends on risk, uncertainty and resolvability only. Priority
//! is never read here. Every trigger is evaluated and all reasons that fire
//! are reported in a fixed order.

use super::risk::LOW_CONFIDENCE_THRESHOLD;
use super::types::{
    ClassificationResult, EscalationResult, EscalationTrigger, ResolutionResult, RiskAssessment,
    RiskLevel,
};

/// Resolution confidence below which auto-resolution is unsafe.
pub const LOW_RESOLUTION_CONFIDENCE: f64 = 0.6;

/// Decide whether the ticket needs a human.
pub fn check_escalation(
    classification: &ClassificationResult,
    resolution: &ResolutionResult,
    risk: &RiskAssessment,
) -> EscalationResult {
    let mut triggers = Vec::new();
    let mut reasons = Vec::new();

    if risk.risk_level == RiskLevel::High {
        triggers.push(EscalationTrigger::HighRisk);
        reasons.push(format!("High risk: {}", risk.risk_reasoning));
    }

    if classification.confidence < LOW_CONFIDENCE_THRESHOLD {
        triggers.push(EscalationTrigger::LowClassificationConfidence);
        reasons.push(format!(
            "Low classification confidence ({}): High uncertainty requires human review",
            classification.confidence
        ));
    }

    if resolution.confidence < LOW_RESOLUTION_CONFIDENCE {
        triggers.push(EscalationTrigger::LowResolutionConfidence);
        reasons.push(format!(
            "Low resolution confidence ({}): Cannot safely auto-resolve",
            resolution.confidence
        ));
    }

    if !classification.is_routine_issue && !resolution.can_resolve {
        triggers.push(EscalationTrigger::NonRoutineUnresolved);
        reasons.push(
            "Non-routine issue cannot be auto-resolved: Requires human expertise".to_string(),
        );
    }

    let escalate = !triggers.is_empty();
    let escalation_reason = reasons.join("; ");
    let explanation = if escalate {
        format!("Escalation triggered: {}", escalation_reason)
    } else {
        "No escalation needed. Ticket can be safely processed automatically.".to_string()
    };

    EscalationResult {
        escalate,
        escalation_reason,
        explanation,
        triggers,
    }
}
