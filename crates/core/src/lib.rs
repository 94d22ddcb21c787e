pub mod agents;
pub mod config;
pub mod decision_log;
pub mod health;
pub mod knowledge;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod testing;
pub mod ticket;

pub use agents::{
    check_escalation, classify, classify_text, evaluate_risk, ClassificationResult,
    DecisionRecord, EscalationResult, ResolutionResult, Resolver, RiskAssessment, TicketText,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    KnowledgeBackend, KnowledgeConfig, SanitizedConfig, ServerConfig,
};
pub use decision_log::{
    create_decision_log_system, DecisionLogHandle, DecisionLogStore, DecisionLogWriter,
    SqliteDecisionLogStore,
};
pub use health::{CollaboratorHealth, HealthCheck};
pub use knowledge::{HttpKnowledgeClient, KnowledgeLookup, SqliteKnowledgeStore};
pub use orchestrator::{OrchestratorConfig, OrchestratorError, TicketOrchestrator};
pub use pipeline::{
    derive_status, PipelineError, ProcessTicketRequest, TicketOutcome, TriagePipeline,
};
pub use ticket::{SqliteTicketStore, Ticket, TicketStatus, TicketStore};
