//! Ticket lifecycle integration tests.
//!
//! These tests wire the real SQLite stores, the decision log writer and the
//! orchestrator together on one database file:
//! Received -> auto_resolved | escalated | awaiting_clarification

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use triage_core::{
    create_decision_log_system,
    decision_log::DecisionLogFilter,
    knowledge::{CreateArticleRequest, KnowledgeLookup},
    ticket::{CreateTicketRequest, TicketFilter},
    DecisionLogStore, OrchestratorConfig, Resolver, SqliteDecisionLogStore, SqliteKnowledgeStore,
    SqliteTicketStore, TicketOrchestrator, TicketStatus, TicketStore, TriagePipeline,
};

/// Test helper holding every store and a running orchestrator.
struct TestHarness {
    ticket_store: Arc<SqliteTicketStore>,
    decision_store: Arc<SqliteDecisionLogStore>,
    knowledge_store: Arc<SqliteKnowledgeStore>,
    orchestrator: Arc<TicketOrchestrator>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let ticket_store =
            Arc::new(SqliteTicketStore::new(&db_path).expect("Failed to create ticket store"));
        let decision_store = Arc::new(
            SqliteDecisionLogStore::new(&db_path).expect("Failed to create decision log store"),
        );
        let knowledge_store = Arc::new(
            SqliteKnowledgeStore::new(&db_path).expect("Failed to create knowledge store"),
        );

        let config = OrchestratorConfig::default();
        let (decision_log, writer) = create_decision_log_system(
            Arc::clone(&decision_store) as Arc<dyn DecisionLogStore>,
            config.decision_log_buffer,
        );
        tokio::spawn(writer.run());

        let resolver = Resolver::new(
            Some(Arc::clone(&knowledge_store) as Arc<dyn KnowledgeLookup>),
            Duration::from_secs(3),
        );
        let pipeline = TriagePipeline::new(resolver).with_decision_log(decision_log);
        let orchestrator = Arc::new(TicketOrchestrator::new(
            config,
            Arc::clone(&ticket_store) as Arc<dyn TicketStore>,
            pipeline,
        ));

        Self {
            ticket_store,
            decision_store,
            knowledge_store,
            orchestrator,
            _temp_dir: temp_dir,
        }
    }

    fn submit(&self, title: &str, description: &str) -> String {
        self.orchestrator
            .submit(CreateTicketRequest {
                title: title.to_string(),
                description: description.to_string(),
            })
            .expect("Failed to submit ticket")
            .id
    }

    /// Wait until the ticket leaves `Received`.
    async fn wait_processed(&self, ticket_id: &str) -> TicketStatus {
        for _ in 0..200 {
            let ticket = self.ticket_store.get(ticket_id).unwrap().unwrap();
            if ticket.status != TicketStatus::Received {
                return ticket.status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("ticket {} was never processed", ticket_id);
    }

    /// Wait until the decision log holds `expected` entries for the ticket.
    async fn wait_decisions(&self, ticket_id: &str, expected: i64) -> i64 {
        let filter = DecisionLogFilter::new().with_ticket_id(ticket_id);
        let mut count = 0;
        for _ in 0..200 {
            count = self.decision_store.count(&filter).unwrap();
            if count >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        count
    }
}

#[tokio::test]
async fn test_submitted_tickets_reach_their_final_status() {
    let harness = TestHarness::new();

    let routine = harness.submit("Forgot my password", "can't remember password");
    let security = harness.submit("Account hacked", "someone made unauthorized charges");
    let vague = harness.submit("xyz", "abc");

    assert_eq!(
        harness.wait_processed(&routine).await,
        TicketStatus::AutoResolved
    );
    assert_eq!(
        harness.wait_processed(&security).await,
        TicketStatus::Escalated
    );
    assert_eq!(
        harness.wait_processed(&vague).await,
        TicketStatus::AwaitingClarification
    );

    let escalated = harness
        .ticket_store
        .list(&TicketFilter::new().with_status(TicketStatus::Escalated))
        .unwrap();
    assert_eq!(escalated.len(), 1);
    assert_eq!(escalated[0].id, security);
    assert!(escalated[0].escalation_reason.contains("High risk"));
}

#[tokio::test]
async fn test_decision_log_receives_every_agent_record() {
    let harness = TestHarness::new();
    let ticket_id = harness.submit("Forgot my password", "can't remember password");

    harness.wait_processed(&ticket_id).await;
    assert_eq!(harness.wait_decisions(&ticket_id, 4).await, 4);

    let entries = harness
        .decision_store
        .query(&DecisionLogFilter::new().with_ticket_id(&ticket_id))
        .unwrap();
    assert!(entries.iter().all(|e| e.ticket_id == ticket_id));

    let ticket = harness.ticket_store.get(&ticket_id).unwrap().unwrap();
    assert_eq!(ticket.agent_decisions.len(), 4);
}

#[tokio::test]
async fn test_reprocess_appends_history_and_keeps_status() {
    let harness = TestHarness::new();
    let ticket_id = harness.submit("Account hacked", "help");
    let first_status = harness.wait_processed(&ticket_id).await;

    let refreshed = harness.orchestrator.reprocess(&ticket_id).await.unwrap();
    assert_eq!(refreshed.status, first_status);
    assert_eq!(refreshed.agent_decisions.len(), 8);
    assert_eq!(harness.wait_decisions(&ticket_id, 8).await, 8);
}

#[tokio::test]
async fn test_local_knowledge_article_resolves_ticket() {
    let harness = TestHarness::new();
    harness
        .knowledge_store
        .create_article(CreateArticleRequest {
            title: "Export error".to_string(),
            content: "Known issue: Export error the CSV export is not working. Clear the cache and retry.".to_string(),
            tags: vec!["export".to_string()],
        })
        .unwrap();

    let ticket_id = harness.submit("Export error", "the CSV export is not working");
    assert_eq!(
        harness.wait_processed(&ticket_id).await,
        TicketStatus::AutoResolved
    );

    let ticket = harness.ticket_store.get(&ticket_id).unwrap().unwrap();
    assert!(!ticket.resolution_used_fallback);
    assert!(ticket
        .resolution_steps
        .starts_with("Refer to knowledge base article: Export error"));
}

#[tokio::test]
async fn test_missing_article_escalates_technical_ticket() {
    let harness = TestHarness::new();
    let ticket_id = harness.submit("Export error", "the CSV export is not working");

    assert_eq!(
        harness.wait_processed(&ticket_id).await,
        TicketStatus::Escalated
    );
}
