use std::sync::Arc;
use triage_core::{
    Config, DecisionLogStore, SanitizedConfig, SqliteKnowledgeStore, TicketOrchestrator,
    TicketStore, TriagePipeline,
};

/// Shared application state
pub struct AppState {
    config: Config,
    ticket_store: Arc<dyn TicketStore>,
    decision_log_store: Arc<dyn DecisionLogStore>,
    knowledge_store: Arc<SqliteKnowledgeStore>,
    orchestrator: Arc<TicketOrchestrator>,
}

impl AppState {
    pub fn new(
        config: Config,
        ticket_store: Arc<dyn TicketStore>,
        decision_log_store: Arc<dyn DecisionLogStore>,
        knowledge_store: Arc<SqliteKnowledgeStore>,
        orchestrator: Arc<TicketOrchestrator>,
    ) -> Self {
        Self {
            config,
            ticket_store,
            decision_log_store,
            knowledge_store,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn ticket_store(&self) -> &dyn TicketStore {
        self.ticket_store.as_ref()
    }

    pub fn decision_log_store(&self) -> &dyn DecisionLogStore {
        self.decision_log_store.as_ref()
    }

    /// The local article store, served under `/knowledge`.
    pub fn knowledge_store(&self) -> &SqliteKnowledgeStore {
        self.knowledge_store.as_ref()
    }

    pub fn orchestrator(&self) -> &Arc<TicketOrchestrator> {
        &self.orchestrator
    }

    pub fn pipeline(&self) -> &TriagePipeline {
        self.orchestrator.pipeline()
    }
}
