//! Keyword-table ticket classifier.
//!
//! Three ordered groups of rules are scanned top to bottom: routine issues,
//! high-priority non-routine issues, then medium-priority issues. Within a
//! group rules are scanned in declaration order and keywords left to right.
//! The first keyword found as a substring of the lower-cased ticket text
//! wins. Routine rules come first so that e.g. a password reset that also
//! mentions "error" still classifies as routine.

use super::types::{Category, ClassificationReason, ClassificationResult, Priority, TicketText};

/// Confidence attached to any routine-table match.
pub const ROUTINE_CONFIDENCE: f64 = 0.9;
/// Confidence attached to any high-priority-table match.
pub const HIGH_PRIORITY_CONFIDENCE: f64 = 0.85;
/// Confidence attached to any medium-priority-table match.
pub const MEDIUM_PRIORITY_CONFIDENCE: f64 = 0.75;
/// Confidence of the fallback classification when nothing matches.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// A set of keywords mapped to a category/priority outcome.
#[derive(Debug)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub category: Category,
    pub priority: Priority,
}

/// An ordered tier of keyword rules sharing a confidence and routineness.
#[derive(Debug)]
pub struct RuleGroup {
    pub reason: ClassificationReason,
    pub confidence: f64,
    pub is_routine: bool,
    pub rules: &'static [KeywordRule],
}

const ROUTINE_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &[
            "forgot password",
            "reset password",
            "password reset",
            "password",
            "can't remember password",
            "need to reset",
        ],
        category: Category::Account,
        priority: Priority::Medium,
    },
    KeywordRule {
        keywords: &[
            "login help",
            "can't login",
            "unable to login",
            "login issue",
            "cannot login",
        ],
        category: Category::Account,
        priority: Priority::Medium,
    },
    KeywordRule {
        keywords: &["update profile", "change profile", "edit profile"],
        category: Category::Account,
        priority: Priority::Low,
    },
    KeywordRule {
        keywords: &["change email", "update email"],
        category: Category::Account,
        priority: Priority::Medium,
    },
];

const HIGH_PRIORITY_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &[
            "hacked",
            "compromised",
            "unauthorized access",
            "security breach",
        ],
        category: Category::Security,
        priority: Priority::High,
    },
    KeywordRule {
        keywords: &["payment", "billing", "charge", "refund", "double charge"],
        category: Category::Billing,
        priority: Priority::High,
    },
    KeywordRule {
        keywords: &["fraud", "suspicious", "stolen"],
        category: Category::Security,
        priority: Priority::High,
    },
];

const MEDIUM_PRIORITY_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["error", "bug", "not working", "broken"],
        category: Category::Technical,
        priority: Priority::Medium,
    },
    KeywordRule {
        keywords: &["feature request", "suggestion", "improvement"],
        category: Category::FeatureRequest,
        priority: Priority::Low,
    },
];

/// Rule groups in evaluation order. The order is part of the contract.
pub const RULE_GROUPS: &[RuleGroup] = &[
    RuleGroup {
        reason: ClassificationReason::RoutineMatch,
        confidence: ROUTINE_CONFIDENCE,
        is_routine: true,
        rules: ROUTINE_RULES,
    },
    RuleGroup {
        reason: ClassificationReason::HighPriorityMatch,
        confidence: HIGH_PRIORITY_CONFIDENCE,
        is_routine: false,
        rules: HIGH_PRIORITY_RULES,
    },
    RuleGroup {
        reason: ClassificationReason::MediumPriorityMatch,
        confidence: MEDIUM_PRIORITY_CONFIDENCE,
        is_routine: false,
        rules: MEDIUM_PRIORITY_RULES,
    },
];

/// Classify a ticket. Total: always returns a result.
pub fn classify(title: &str, description: &str) -> ClassificationResult {
    classify_text(&TicketText::new(title, description))
}

/// Classify an already-assembled ticket text.
pub fn classify_text(ticket: &TicketText) -> ClassificationResult {
    let text = ticket.combined_text();

    for group in RULE_GROUPS {
        for rule in group.rules {
            if let Some(keyword) = rule.keywords.iter().find(|k| text.contains(*k)) {
                return matched(group, rule, keyword);
            }
        }
    }

    ClassificationResult {
        category: Category::General,
        priority: Priority::Low,
        confidence: DEFAULT_CONFIDENCE,
        is_routine_issue: false,
        explanation: "Unable to clearly classify this ticket. Low confidence classification - \
                      may require clarification or human review."
            .to_string(),
        reason_code: ClassificationReason::NoMatch,
        matched_keyword: None,
    }
}

fn matched(group: &RuleGroup, rule: &KeywordRule, keyword: &str) -> ClassificationResult {
    let explanation = match group.reason {
        ClassificationReason::RoutineMatch => format!(
            "Identified as routine {} issue: \"{}\". This is a common, low-risk request that can be safely auto-resolved.",
            rule.category, keyword
        ),
        ClassificationReason::HighPriorityMatch => format!(
            "Identified as high-priority {} issue: \"{}\". This requires human review due to potential security or financial impact.",
            rule.category, keyword
        ),
        _ => format!(
            "Identified as {} priority {} issue: \"{}\".",
            rule.priority, rule.category, keyword
        ),
    };

    ClassificationResult {
        category: rule.category,
        priority: rule.priority,
        confidence: group.confidence,
        is_routine_issue: group.is_routine,
        explanation,
        reason_code: group.reason,
        matched_keyword: Some(keyword.to_string()),
    }
}
