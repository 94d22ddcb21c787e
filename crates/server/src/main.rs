use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triage_core::{
    agents::MAX_LOOKUP_TIMEOUT_MS, create_decision_log_system, load_config,
    orchestrator::TicketUpdateCallback, validate_config, Config, DecisionLogStore,
    HttpKnowledgeClient, KnowledgeBackend, KnowledgeLookup, Resolver, SqliteDecisionLogStore,
    SqliteKnowledgeStore, SqliteTicketStore, TicketOrchestrator, TicketStatus, TicketStore,
    TriagePipeline,
};

use triage_server::api::create_router;
use triage_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TRIAGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Stores share one SQLite file
    let ticket_store: Arc<dyn TicketStore> = Arc::new(
        SqliteTicketStore::new(&config.database.path).context("Failed to create ticket store")?,
    );
    info!("Ticket store initialized");

    let decision_log_store: Arc<dyn DecisionLogStore> = Arc::new(
        SqliteDecisionLogStore::new(&config.database.path)
            .context("Failed to create decision log store")?,
    );
    info!("Decision log store initialized");

    let knowledge_store = Arc::new(
        SqliteKnowledgeStore::new(&config.database.path)
            .context("Failed to create knowledge store")?,
    );
    info!("Knowledge store initialized");

    let resolver = create_resolver(&config, &knowledge_store)?;

    // Decision log system
    let (decision_log, decision_log_writer) = create_decision_log_system(
        Arc::clone(&decision_log_store),
        config.orchestrator.decision_log_buffer,
    );
    let writer_handle = tokio::spawn(decision_log_writer.run());

    let pipeline = TriagePipeline::new(resolver).with_decision_log(decision_log);

    let update_callback: TicketUpdateCallback =
        Arc::new(|ticket_id: &str, status: TicketStatus| {
            info!(ticket_id = %ticket_id, status = %status, "Ticket updated");
        });

    let orchestrator = Arc::new(
        TicketOrchestrator::new(
            config.orchestrator.clone(),
            Arc::clone(&ticket_store),
            pipeline,
        )
        .with_update_callback(update_callback),
    );
    info!("Ticket orchestrator initialized");

    let state = Arc::new(AppState::new(
        config.clone(),
        ticket_store,
        decision_log_store,
        knowledge_store,
        Arc::clone(&orchestrator),
    ));

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // The pipeline inside the orchestrator holds the last DecisionLogHandle;
    // dropping it closes the channel so the writer can drain and exit.
    drop(orchestrator);

    let _ = writer_handle.await;
    info!("Decision log writer stopped");

    Ok(())
}

/// Build the resolver with the configured knowledge lookup, if any.
fn create_resolver(
    config: &Config,
    knowledge_store: &Arc<SqliteKnowledgeStore>,
) -> Result<Resolver> {
    let max_timeout = Duration::from_millis(MAX_LOOKUP_TIMEOUT_MS);

    let Some(knowledge) = &config.knowledge else {
        info!("No knowledge lookup configured");
        return Ok(Resolver::new(None, max_timeout));
    };

    match knowledge.backend {
        KnowledgeBackend::Http => {
            let http = knowledge
                .http
                .as_ref()
                .context("Knowledge backend is http but [knowledge.http] is missing")?;
            info!("Using knowledge service at {}", http.url);
            let client =
                HttpKnowledgeClient::from_config(http).context("Failed to create knowledge client")?;
            Ok(Resolver::new(
                Some(Arc::new(client) as Arc<dyn KnowledgeLookup>),
                Duration::from_millis(http.timeout_ms),
            ))
        }
        KnowledgeBackend::Local => {
            info!("Using local knowledge store");
            Ok(Resolver::new(
                Some(Arc::clone(knowledge_store) as Arc<dyn KnowledgeLookup>),
                max_timeout,
            ))
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
