//! Collaborator health.
//!
//! Stores report whether their backing resource is usable. The decision
//! agents never consult this; only the orchestration layer, the decision-log
//! writer and the health endpoint do.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Tri-state readiness of an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorHealth {
    Connected,
    /// Temporarily busy or still starting up.
    Connecting,
    Disconnected,
}

impl CollaboratorHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Probe a SQLite connection with a trivial query.
    pub fn from_probe(conn: &Connection) -> Self {
        match conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)) {
            Ok(_) => Self::Connected,
            Err(_) => Self::Disconnected,
        }
    }
}

impl std::fmt::Display for CollaboratorHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by collaborators that can report their readiness.
pub trait HealthCheck: Send + Sync {
    fn health(&self) -> CollaboratorHealth;
}
