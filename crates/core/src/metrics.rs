//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Pipeline (runs by final status, escalation triggers, duration)
//! - Knowledge lookup (outcomes, latency)
//! - Orchestrator (processing failures)
//! - Decision log (dropped and failed writes)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Pipeline
// =============================================================================

/// Pipeline runs by final status.
pub static TICKETS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_tickets_processed_total",
            "Total pipeline runs by final ticket status",
        ),
        &["status"], // "auto_resolved", "escalated", "awaiting_clarification"
    )
    .unwrap()
});

/// Escalation triggers that fired.
pub static ESCALATION_TRIGGERS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_escalation_triggers_total",
            "Escalation triggers fired, by trigger",
        ),
        &["trigger"],
    )
    .unwrap()
});

/// Pipeline duration in seconds.
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "triage_pipeline_duration_seconds",
            "Duration of a full pipeline run",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 3.0, 5.0]),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Knowledge lookup
// =============================================================================

/// Knowledge lookups by backend and outcome.
pub static KNOWLEDGE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_knowledge_lookups_total",
            "Knowledge lookups by backend and outcome",
        ),
        &["backend", "outcome"], // "found", "no_results", "unavailable", "timed_out"
    )
    .unwrap()
});

/// Knowledge lookup latency in seconds.
pub static KNOWLEDGE_LOOKUP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "triage_knowledge_lookup_duration_seconds",
            "Knowledge lookup latency",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0]),
        &["backend"],
    )
    .unwrap()
});

// =============================================================================
// Orchestrator
// =============================================================================

/// Ticket processing failures that reset a ticket to `Received`.
pub static PROCESSING_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_processing_failures_total",
            "Ticket processing failures by reason",
        ),
        &["reason"], // "timeout", "pipeline", "persistence"
    )
    .unwrap()
});

// =============================================================================
// Decision log
// =============================================================================

/// Decision batches dropped because the channel was full or closed.
pub static DECISION_LOG_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "triage_decision_log_dropped_total",
        "Decision batches dropped before reaching the writer",
    )
    .unwrap()
});

/// Decision records the writer failed to persist.
pub static DECISION_LOG_WRITE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "triage_decision_log_write_failures_total",
        "Decision records that failed to persist",
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(TICKETS_PROCESSED.clone()),
        Box::new(ESCALATION_TRIGGERS.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        // Knowledge lookup
        Box::new(KNOWLEDGE_LOOKUPS.clone()),
        Box::new(KNOWLEDGE_LOOKUP_DURATION.clone()),
        // Orchestrator
        Box::new(PROCESSING_FAILURES.clone()),
        // Decision log
        Box::new(DECISION_LOG_DROPPED.clone()),
        Box::new(DECISION_LOG_WRITE_FAILURES.clone()),
    ]
}
