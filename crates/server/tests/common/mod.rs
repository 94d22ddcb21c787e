//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by real SQLite stores in a temp directory and a mock knowledge
//! lookup, so the whole HTTP surface can be exercised without external
//! services.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use triage_core::{
    create_decision_log_system, testing::MockKnowledgeLookup, Config, DatabaseConfig,
    DecisionLogStore, KnowledgeLookup, OrchestratorConfig, Resolver, SqliteDecisionLogStore,
    SqliteKnowledgeStore, SqliteTicketStore, TicketOrchestrator, TicketStore, TriagePipeline,
};

/// Re-export fixtures for test convenience
pub use triage_core::testing::fixtures;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_creation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/tickets", json!({
///         "title": "Forgot my password",
///         "description": "please help"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock knowledge lookup used by the resolver
    pub knowledge_lookup: Arc<MockKnowledgeLookup>,
    /// Local article store served under `/knowledge`
    pub knowledge_store: Arc<SqliteKnowledgeStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw body text, for non-JSON endpoints
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with default orchestrator settings.
    pub fn new() -> Self {
        Self::with_orchestrator_config(OrchestratorConfig::default())
    }

    pub fn with_orchestrator_config(orchestrator_config: OrchestratorConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            orchestrator: orchestrator_config.clone(),
            ..Default::default()
        };

        // Create stores
        let ticket_store: Arc<dyn TicketStore> = Arc::new(
            SqliteTicketStore::new(&db_path).expect("Failed to create ticket store"),
        );
        let decision_log_store: Arc<dyn DecisionLogStore> = Arc::new(
            SqliteDecisionLogStore::new(&db_path).expect("Failed to create decision log store"),
        );
        let knowledge_store = Arc::new(
            SqliteKnowledgeStore::new(&db_path).expect("Failed to create knowledge store"),
        );

        // Create decision log system
        let (decision_log, writer) =
            create_decision_log_system(Arc::clone(&decision_log_store), 100);
        tokio::spawn(writer.run());

        let knowledge_lookup = Arc::new(MockKnowledgeLookup::new());
        let resolver = Resolver::new(
            Some(Arc::clone(&knowledge_lookup) as Arc<dyn KnowledgeLookup>),
            Duration::from_millis(500),
        );
        let pipeline = TriagePipeline::new(resolver).with_decision_log(decision_log);
        let orchestrator = Arc::new(TicketOrchestrator::new(
            orchestrator_config,
            Arc::clone(&ticket_store),
            pipeline,
        ));

        let state = Arc::new(triage_server::state::AppState::new(
            config,
            ticket_store,
            decision_log_store,
            Arc::clone(&knowledge_store),
            orchestrator,
        ));

        let router = triage_server::api::create_router(state);

        Self {
            router,
            knowledge_lookup,
            knowledge_store,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PATCH request with JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Create a ticket through the API and return its ID.
    pub async fn create_ticket(&self, title: &str, description: &str) -> String {
        let response = self
            .post(
                "/api/v1/tickets",
                serde_json::json!({ "title": title, "description": description }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    /// Poll a ticket until background processing moved it out of `Received`.
    pub async fn wait_processed(&self, ticket_id: &str) -> Value {
        let path = format!("/api/v1/tickets/{}", ticket_id);
        for _ in 0..200 {
            let response = self.get(&path).await;
            if response.body["status"] != "Received" {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("ticket {} was never processed", ticket_id);
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
