//! The four decision agents.
//!
//! Each agent consumes only the ticket text and the outputs of the agents
//! before it:
//! - **Classifier**: category, priority, routineness, confidence
//! - **Risk evaluator**: potential harm, independent of priority
//! - **Resolver**: whether the ticket can be auto-resolved, optionally via a
//!   bounded knowledge lookup
//! - **Escalator**: whether a human must take over
//!
//! All agents except the resolver are pure functions.

mod classifier;
mod escalator;
mod records;
mod resolver;
mod risk;
mod types;

pub use classifier::{
    classify, classify_text, KeywordRule, RuleGroup, DEFAULT_CONFIDENCE,
    HIGH_PRIORITY_CONFIDENCE, MEDIUM_PRIORITY_CONFIDENCE, ROUTINE_CONFIDENCE, RULE_GROUPS,
};
pub use escalator::{check_escalation, LOW_RESOLUTION_CONFIDENCE};
pub use records::build_decision_records;
pub use resolver::{
    FallbackResolution, Resolver, FALLBACK_RESOLUTIONS, KNOWLEDGE_CONFIDENCE,
    MAX_LOOKUP_TIMEOUT_MS, ROUTINE_RESOLVE_THRESHOLD,
};
pub use risk::{evaluate_risk, HIGH_RISK_INDICATORS, LOW_CONFIDENCE_THRESHOLD};
pub use types::*;
