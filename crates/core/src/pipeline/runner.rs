//! Pipeline runner.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::agents::{
    build_decision_records, check_escalation, classify_text, evaluate_risk, ClassificationResult,
    EscalationResult, ResolutionResult, Resolver, RiskAssessment, RiskLevel, TicketText,
    LOW_CONFIDENCE_THRESHOLD,
};
use crate::decision_log::{DecisionBatch, DecisionLogHandle};
use crate::metrics;
use crate::ticket::TicketStatus;

use super::types::{PipelineError, ProcessTicketRequest, TicketOutcome};

/// Derive the ticket status from the agent results.
///
/// An escalation caused by an uncertain classification of a ticket that is
/// not high risk asks the customer for more detail instead of paging a human.
pub fn derive_status(
    classification: &ClassificationResult,
    risk: &RiskAssessment,
    resolution: &ResolutionResult,
    escalation: &EscalationResult,
) -> TicketStatus {
    if escalation.escalate {
        if classification.confidence < LOW_CONFIDENCE_THRESHOLD && risk.risk_level != RiskLevel::High
        {
            TicketStatus::AwaitingClarification
        } else {
            TicketStatus::Escalated
        }
    } else if resolution.can_resolve {
        TicketStatus::AutoResolved
    } else {
        TicketStatus::AwaitingClarification
    }
}

/// Runs the agents on a ticket.
///
/// Cheap to clone; clones share the resolver's lookup and the decision log
/// channel.
#[derive(Debug, Clone)]
pub struct TriagePipeline {
    resolver: Resolver,
    decision_log: Option<DecisionLogHandle>,
}

impl TriagePipeline {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            decision_log: None,
        }
    }

    /// Forward decision records of runs that carry a ticket id to `handle`.
    pub fn with_decision_log(mut self, handle: DecisionLogHandle) -> Self {
        self.decision_log = Some(handle);
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Validate the request, run the agents and forward the decision records.
    pub async fn process(
        &self,
        request: &ProcessTicketRequest,
    ) -> Result<TicketOutcome, PipelineError> {
        // Whitespace only counts for validation; the agents see the text as sent
        if request.title.trim().is_empty() || request.description.trim().is_empty() {
            return Err(PipelineError::Validation(
                "title and description are required".to_string(),
            ));
        }

        let outcome = self
            .run(&TicketText::new(&request.title, &request.description))
            .await;

        if let Some(ticket_id) = &request.ticket_id {
            self.forward_decisions(ticket_id, &outcome);
        }

        Ok(outcome)
    }

    /// Run the four agents on already validated text. Never fails.
    pub async fn run(&self, ticket: &TicketText) -> TicketOutcome {
        let start = Instant::now();

        let classification = classify_text(ticket);
        debug!(
            category = %classification.category,
            priority = %classification.priority,
            confidence = classification.confidence,
            "Ticket classified"
        );

        let risk = evaluate_risk(&classification, &ticket.raw_text());
        let resolution = self.resolver.resolve(ticket, &classification).await;
        let escalation = check_escalation(&classification, &resolution, &risk);
        let status = derive_status(&classification, &risk, &resolution, &escalation);

        let decision_records =
            build_decision_records(&classification, &risk, &resolution, &escalation, Utc::now());

        metrics::TICKETS_PROCESSED
            .with_label_values(&[status.as_str()])
            .inc();
        for trigger in &escalation.triggers {
            metrics::ESCALATION_TRIGGERS
                .with_label_values(&[trigger.as_str()])
                .inc();
        }
        metrics::PIPELINE_DURATION
            .with_label_values(&[status.as_str()])
            .observe(start.elapsed().as_secs_f64());

        info!(
            status = %status,
            risk = %risk.risk_level,
            escalate = escalation.escalate,
            knowledge_lookup = resolution.knowledge_lookup.as_str(),
            "Pipeline run complete"
        );

        TicketOutcome {
            classification,
            risk,
            resolution,
            escalation,
            status,
            decision_records,
        }
    }

    fn forward_decisions(&self, ticket_id: &str, outcome: &TicketOutcome) {
        let Some(handle) = &self.decision_log else {
            debug!(ticket_id = %ticket_id, "No decision log configured, skipping");
            return;
        };

        // Failure is logged and counted by the handle
        handle.try_emit(DecisionBatch {
            ticket_id: ticket_id.to_string(),
            records: outcome.decision_records.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::agents::{AgentKind, Category, KnowledgeLookupOutcome, Priority};
    use crate::knowledge::{KnowledgeError, KnowledgeLookup};
    use crate::testing::{fixtures, MockKnowledgeLookup};

    fn pipeline_with(mock: &Arc<MockKnowledgeLookup>) -> TriagePipeline {
        let lookup = Arc::clone(mock) as Arc<dyn KnowledgeLookup>;
        TriagePipeline::new(Resolver::new(Some(lookup), Duration::from_millis(200)))
    }

    fn request_for(ticket: &TicketText) -> ProcessTicketRequest {
        ProcessTicketRequest::new(ticket.title.clone(), ticket.description.clone())
    }

    #[tokio::test]
    async fn test_routine_password_ticket_auto_resolves() {
        let mock = Arc::new(MockKnowledgeLookup::new());
        let pipeline = pipeline_with(&mock);

        let outcome = pipeline
            .process(&request_for(&fixtures::password_ticket()))
            .await
            .unwrap();

        assert_eq!(outcome.classification.category, Category::Account);
        assert_eq!(outcome.classification.priority, Priority::Medium);
        assert!(outcome.classification.is_routine_issue);
        assert_eq!(outcome.risk.risk_level, RiskLevel::Low);
        assert!(outcome.resolution.can_resolve);
        assert!(outcome.resolution.used_fallback);
        assert!(!outcome.escalation.escalate);
        assert_eq!(outcome.status, TicketStatus::AutoResolved);
        assert_eq!(mock.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_hacked_ticket_escalates() {
        let mock = Arc::new(MockKnowledgeLookup::new());
        let pipeline = pipeline_with(&mock);

        let outcome = pipeline
            .process(&request_for(&fixtures::hacked_ticket()))
            .await
            .unwrap();

        assert_eq!(outcome.classification.category, Category::Security);
        assert_eq!(outcome.risk.risk_level, RiskLevel::High);
        assert!(outcome.escalation.escalate);
        assert!(outcome.escalation.escalation_reason.contains("High risk"));
        assert_eq!(outcome.status, TicketStatus::Escalated);
    }

    #[tokio::test]
    async fn test_unclassifiable_ticket_awaits_clarification() {
        let mock = Arc::new(MockKnowledgeLookup::new());
        let pipeline = pipeline_with(&mock);

        let outcome = pipeline
            .process(&request_for(&fixtures::unclassifiable_ticket()))
            .await
            .unwrap();

        assert_eq!(outcome.classification.confidence, 0.5);
        assert!(outcome.escalation.escalate);
        assert_ne!(outcome.risk.risk_level, RiskLevel::High);
        assert_eq!(outcome.status, TicketStatus::AwaitingClarification);
    }

    #[tokio::test]
    async fn test_knowledge_article_resolves_technical_ticket() {
        let mock = Arc::new(MockKnowledgeLookup::new());
        mock.set_articles(vec![fixtures::article(
            "Fixing CSV export",
            "Clear the export cache and retry.",
            &["export"],
        )])
        .await;
        let pipeline = pipeline_with(&mock);

        let outcome = pipeline
            .process(&request_for(&fixtures::export_bug_ticket()))
            .await
            .unwrap();

        assert_eq!(outcome.classification.category, Category::Technical);
        assert_eq!(outcome.resolution.knowledge_lookup, KnowledgeLookupOutcome::Found);
        assert!(outcome.resolution.can_resolve);
        assert!(!outcome.resolution.used_fallback);
        assert_eq!(outcome.status, TicketStatus::AutoResolved);
        assert_eq!(
            mock.recorded_queries().await,
            vec!["Export error the CSV export is not working".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unavailable_lookup_is_not_an_error() {
        let mock = Arc::new(MockKnowledgeLookup::new());
        mock.set_next_error(KnowledgeError::ConnectionFailed("refused".to_string()))
            .await;
        let pipeline = pipeline_with(&mock);

        let outcome = pipeline
            .process(&request_for(&fixtures::export_bug_ticket()))
            .await
            .unwrap();

        assert_eq!(
            outcome.resolution.knowledge_lookup,
            KnowledgeLookupOutcome::Unavailable
        );
        assert!(!outcome.resolution.can_resolve);
        assert_eq!(outcome.status, TicketStatus::Escalated);
    }

    #[tokio::test]
    async fn test_validation_rejects_blank_fields() {
        let mock = Arc::new(MockKnowledgeLookup::new());
        let pipeline = pipeline_with(&mock);

        for (title, description) in [("", "desc"), ("title", ""), ("   ", "desc"), ("t", "\n\t")] {
            let err = pipeline
                .process(&ProcessTicketRequest::new(title, description))
                .await
                .unwrap_err();
            assert!(matches!(err, PipelineError::Validation(_)));
        }
        assert_eq!(mock.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_process_matches_untrimmed_text() {
        let mock = Arc::new(MockKnowledgeLookup::new());
        let pipeline = pipeline_with(&mock);

        // "Forgot " + " " + "password" leaves two spaces, so the phrase
        // "forgot password" must not match.
        let processed = pipeline
            .process(&ProcessTicketRequest::new("Forgot ", "password"))
            .await
            .unwrap();
        let direct = pipeline.run(&TicketText::new("Forgot ", "password")).await;

        assert_eq!(
            processed.classification.matched_keyword.as_deref(),
            Some("password")
        );
        assert_eq!(processed.classification, direct.classification);
        assert_eq!(processed.resolution, direct.resolution);
        assert_eq!(processed.status, direct.status);
    }

    #[tokio::test]
    async fn test_decision_records_forwarded_with_ticket_id() {
        let (tx, mut rx) = mpsc::channel(10);
        let pipeline = TriagePipeline::new(Resolver::without_knowledge())
            .with_decision_log(DecisionLogHandle::new(tx));

        let request = request_for(&fixtures::password_ticket()).with_ticket_id("t-42");
        let outcome = pipeline.process(&request).await.unwrap();

        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.ticket_id, "t-42");
        assert_eq!(batch.records, outcome.decision_records);
        assert_eq!(
            batch.records.iter().map(|r| r.agent).collect::<Vec<_>>(),
            vec![
                AgentKind::Classifier,
                AgentKind::RiskEvaluator,
                AgentKind::Resolution,
                AgentKind::Escalation
            ]
        );
    }

    #[tokio::test]
    async fn test_no_forwarding_without_ticket_id() {
        let (tx, mut rx) = mpsc::channel(10);
        let pipeline = TriagePipeline::new(Resolver::without_knowledge())
            .with_decision_log(DecisionLogHandle::new(tx));

        pipeline
            .process(&request_for(&fixtures::password_ticket()))
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_decision_log_does_not_affect_result() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let pipeline = TriagePipeline::new(Resolver::without_knowledge())
            .with_decision_log(DecisionLogHandle::new(tx));

        let request = request_for(&fixtures::hacked_ticket()).with_ticket_id("t-1");
        let outcome = pipeline.process(&request).await.unwrap();
        assert_eq!(outcome.status, TicketStatus::Escalated);
    }

    #[tokio::test]
    async fn test_outcome_serializes_classifier_key() {
        let pipeline = TriagePipeline::new(Resolver::without_knowledge());
        let outcome = pipeline.run(&fixtures::password_ticket()).await;

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["classifier"]["category"], "Account");
        assert_eq!(json["status"], "auto_resolved");
        assert_eq!(json["decisionRecords"].as_array().unwrap().len(), 4);
        assert!(json.get("classification").is_none());
    }

    #[test]
    fn test_request_deserializes_camel_case_with_missing_fields() {
        let request: ProcessTicketRequest =
            serde_json::from_str(r#"{"title":"t","ticketId":"abc"}"#).unwrap();
        assert_eq!(request.title, "t");
        assert!(request.description.is_empty());
        assert_eq!(request.ticket_id.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_derive_status_table() {
        let pipeline = TriagePipeline::new(Resolver::without_knowledge());
        let outcome = pipeline.run(&fixtures::unclassifiable_ticket()).await;
        let base_escalation = outcome.escalation.clone();

        // Escalation with low confidence but high risk goes to a human
        let mut high_risk = outcome.risk.clone();
        high_risk.risk_level = RiskLevel::High;
        assert_eq!(
            derive_status(
                &outcome.classification,
                &high_risk,
                &outcome.resolution,
                &base_escalation
            ),
            TicketStatus::Escalated
        );

        // No escalation and unresolvable
        let mut quiet = base_escalation.clone();
        quiet.escalate = false;
        assert_eq!(
            derive_status(&outcome.classification, &outcome.risk, &outcome.resolution, &quiet),
            TicketStatus::AwaitingClarification
        );

        // No escalation and resolvable
        let mut resolved = outcome.resolution.clone();
        resolved.can_resolve = true;
        assert_eq!(
            derive_status(&outcome.classification, &outcome.risk, &resolved, &quiet),
            TicketStatus::AutoResolved
        );
    }
}
