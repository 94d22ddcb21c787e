//! End-to-end triage scenarios.
//!
//! These tests run the full agent chain on realistic tickets and check the
//! properties callers rely on: derived status, lookup usage, the lookup time
//! bound, and repeatability.

use std::sync::Arc;
use std::time::{Duration, Instant};

use triage_core::{
    agents::{
        check_escalation, classify, evaluate_risk, KnowledgeLookupOutcome, Priority, RiskLevel,
    },
    knowledge::KnowledgeLookup,
    testing::{fixtures, MockKnowledgeLookup},
    ProcessTicketRequest, Resolver, TicketStatus, TriagePipeline,
};

fn pipeline_with(mock: &Arc<MockKnowledgeLookup>, lookup_timeout: Duration) -> TriagePipeline {
    let lookup = Arc::clone(mock) as Arc<dyn KnowledgeLookup>;
    TriagePipeline::new(Resolver::new(Some(lookup), lookup_timeout))
}

#[tokio::test]
async fn test_password_reset_is_auto_resolved_without_lookup() {
    let mock = Arc::new(MockKnowledgeLookup::new());
    let pipeline = pipeline_with(&mock, Duration::from_secs(3));

    let outcome = pipeline
        .process(&ProcessTicketRequest::new(
            "Forgot my password",
            "can't remember password",
        ))
        .await
        .unwrap();

    assert_eq!(outcome.status, TicketStatus::AutoResolved);
    assert_eq!(outcome.risk.risk_level, RiskLevel::Low);
    assert!(outcome.resolution.used_fallback);
    assert_eq!(
        outcome.resolution.knowledge_lookup,
        KnowledgeLookupOutcome::NotAttempted
    );
    assert_eq!(mock.search_count().await, 0);
}

#[tokio::test]
async fn test_security_incident_is_escalated() {
    let mock = Arc::new(MockKnowledgeLookup::new());
    let pipeline = pipeline_with(&mock, Duration::from_secs(3));

    let outcome = pipeline
        .process(&ProcessTicketRequest::new(
            "Account hacked",
            "someone made unauthorized charges",
        ))
        .await
        .unwrap();

    assert_eq!(outcome.status, TicketStatus::Escalated);
    assert_eq!(outcome.risk.risk_level, RiskLevel::High);
    assert!(outcome.escalation.escalate);
}

#[tokio::test]
async fn test_gibberish_awaits_clarification() {
    let mock = Arc::new(MockKnowledgeLookup::new());
    let pipeline = pipeline_with(&mock, Duration::from_secs(3));

    let outcome = pipeline
        .process(&ProcessTicketRequest::new("xyz", "abc"))
        .await
        .unwrap();

    assert_eq!(outcome.status, TicketStatus::AwaitingClarification);
    assert_eq!(outcome.classification.confidence, 0.5);
    assert!(!outcome.resolution.can_resolve);
}

#[tokio::test]
async fn test_routine_tickets_never_consult_lookup() {
    let mock = Arc::new(MockKnowledgeLookup::new());
    let pipeline = pipeline_with(&mock, Duration::from_secs(3));

    for (title, description) in [
        ("Forgot my password", "please help"),
        ("Login issue", "can't login since yesterday"),
        ("Profile", "I want to update profile picture"),
        ("Email", "how do I change email"),
    ] {
        let outcome = pipeline
            .process(&ProcessTicketRequest::new(title, description))
            .await
            .unwrap();
        assert!(outcome.classification.is_routine_issue, "{}", title);
    }

    assert_eq!(mock.search_count().await, 0);
}

#[tokio::test]
async fn test_hanging_lookup_is_bounded() {
    let mock = Arc::new(MockKnowledgeLookup::new());
    mock.set_delay(Duration::from_secs(60)).await;
    let pipeline = pipeline_with(&mock, Duration::from_millis(100));

    let start = Instant::now();
    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        pipeline.run(&fixtures::export_bug_ticket()),
    )
    .await
    .expect("pipeline must finish within the lookup bound");

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(
        outcome.resolution.knowledge_lookup,
        KnowledgeLookupOutcome::TimedOut
    );
    assert!(!outcome.resolution.can_resolve);
    assert_eq!(outcome.status, TicketStatus::Escalated);
    assert_eq!(mock.search_count().await, 1);
}

#[test]
fn test_lookup_timeout_is_clamped() {
    let resolver = Resolver::new(None, Duration::from_secs(30));
    assert_eq!(resolver.lookup_timeout(), Duration::from_millis(3000));
}

#[test]
fn test_priority_never_changes_escalation() {
    for (title, description) in [
        ("Forgot my password", "help"),
        ("Account hacked", "help"),
        ("Billing", "double charge on my card"),
        ("Export error", "the CSV export is not working"),
        ("xyz", "abc"),
    ] {
        let classification = classify(title, description);
        let text = format!("{} {}", title, description);
        let risk = evaluate_risk(&classification, &text);

        let resolution = triage_core::ResolutionResult {
            can_resolve: false,
            confidence: 0.5,
            resolution_steps: String::new(),
            used_fallback: false,
            reasoning: String::new(),
            reason_code: triage_core::agents::ResolutionReason::NoMatch,
            knowledge_lookup: KnowledgeLookupOutcome::NotConfigured,
        };

        let baseline = check_escalation(&classification, &resolution, &risk);
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            let mut reprioritized = classification.clone();
            reprioritized.priority = priority;
            assert_eq!(
                check_escalation(&reprioritized, &resolution, &risk),
                baseline,
                "priority {} changed escalation of {:?}",
                priority,
                title
            );
        }
    }
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let mock = Arc::new(MockKnowledgeLookup::new());
    mock.set_articles(vec![fixtures::article(
        "Fixing CSV export",
        "Clear the export cache and retry.",
        &["export"],
    )])
    .await;
    let pipeline = pipeline_with(&mock, Duration::from_secs(3));

    for ticket in [
        fixtures::password_ticket(),
        fixtures::hacked_ticket(),
        fixtures::unclassifiable_ticket(),
        fixtures::export_bug_ticket(),
    ] {
        let first = pipeline.run(&ticket).await;
        let second = pipeline.run(&ticket).await;

        assert_eq!(first.classification, second.classification);
        assert_eq!(first.risk, second.risk);
        assert_eq!(first.resolution, second.resolution);
        assert_eq!(first.escalation, second.escalation);
        assert_eq!(first.status, second.status);

        let decisions = |o: &triage_core::TicketOutcome| {
            o.decision_records
                .iter()
                .map(|r| (r.agent, r.decision.clone(), r.confidence))
                .collect::<Vec<_>>()
        };
        assert_eq!(decisions(&first), decisions(&second));
    }
}

#[tokio::test]
async fn test_concurrent_runs_do_not_interfere() {
    let mock = Arc::new(MockKnowledgeLookup::new());
    let pipeline = pipeline_with(&mock, Duration::from_secs(3));

    let mut handles = Vec::new();
    for i in 0..16 {
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            let ticket = if i % 2 == 0 {
                fixtures::password_ticket()
            } else {
                fixtures::hacked_ticket()
            };
            (i, pipeline.run(&ticket).await.status)
        }));
    }

    for handle in handles {
        let (i, status) = handle.await.unwrap();
        let expected = if i % 2 == 0 {
            TicketStatus::AutoResolved
        } else {
            TicketStatus::Escalated
        };
        assert_eq!(status, expected);
    }
}
