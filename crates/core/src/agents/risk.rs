//! Risk evaluation.
//!
//! Risk measures potential harm from mishandling a ticket and is kept apart
//! from priority. Priority only contributes through the billing and security
//! compound rules, never on its own.

use super::types::{
    Category, ClassificationResult, Priority, RiskAssessment, RiskLevel, RiskReason,
};

/// Any of these in the ticket text means high risk, whatever the classification.
pub const HIGH_RISK_INDICATORS: &[&str] = &[
    "hacked",
    "compromised",
    "unauthorized",
    "breach",
    "fraud",
    "stolen",
    "suspicious",
    "unauthorized access",
    "data leak",
];

/// Classification confidence at or above which a non-routine issue counts as well classified.
pub const WELL_CLASSIFIED_CONFIDENCE: f64 = 0.7;

/// Classification confidence below which the classifier is considered uncertain.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.65;

/// Evaluate the risk of a classified ticket.
///
/// `ticket_text` is the raw `title + " " + description`; it is lower-cased
/// here. Rules form a decision list and the first one that applies wins.
pub fn evaluate_risk(classification: &ClassificationResult, ticket_text: &str) -> RiskAssessment {
    let text = ticket_text.to_lowercase();

    if HIGH_RISK_INDICATORS.iter().any(|k| text.contains(k)) {
        return assessment(
            RiskLevel::High,
            RiskReason::HighRiskIndicator,
            "High risk detected: Security or financial impact potential. This requires immediate human review regardless of priority.".to_string(),
        );
    }

    if classification.category == Category::Billing
        && (classification.priority == Priority::High
            || text.contains("charge")
            || text.contains("payment"))
    {
        return assessment(
            RiskLevel::High,
            RiskReason::FinancialTransaction,
            "High risk: Financial transaction issue. Requires human verification to prevent financial loss.".to_string(),
        );
    }

    if classification.category == Category::Security && classification.priority == Priority::High {
        return assessment(
            RiskLevel::High,
            RiskReason::SecurityHighPriority,
            "High risk: Security-related issue with high priority. Requires immediate human review."
                .to_string(),
        );
    }

    if classification.is_routine_issue {
        return assessment(
            RiskLevel::Low,
            RiskReason::RoutineIssue,
            format!(
                "Low risk: Routine {} issue. These are common, well-understood requests with standard resolution procedures.",
                classification.category
            ),
        );
    }

    if classification.confidence >= WELL_CLASSIFIED_CONFIDENCE {
        return assessment(
            RiskLevel::Medium,
            RiskReason::NonRoutineClassified,
            format!(
                "Medium risk: Non-routine {} issue. Well-classified but requires verification before auto-resolution.",
                classification.category
            ),
        );
    }

    if classification.confidence < LOW_CONFIDENCE_THRESHOLD {
        return assessment(
            RiskLevel::Medium,
            RiskReason::LowConfidence,
            format!(
                "Medium risk: Low classification confidence ({}). Uncertainty requires human review to prevent incorrect resolution.",
                classification.confidence
            ),
        );
    }

    assessment(
        RiskLevel::Medium,
        RiskReason::Default,
        "Medium risk: Standard non-routine issue. Requires human review to ensure appropriate handling."
            .to_string(),
    )
}

fn assessment(risk_level: RiskLevel, reason_code: RiskReason, risk_reasoning: String) -> RiskAssessment {
    RiskAssessment {
        risk_level,
        risk_reasoning,
        reason_code,
    }
}
