use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::agents::AgentKind;
use crate::health::{CollaboratorHealth, HealthCheck};

use super::{DecisionLogEntry, DecisionLogError, DecisionLogFilter, DecisionLogStore};

/// SQLite-backed decision log
pub struct SqliteDecisionLogStore {
    conn: Mutex<Connection>,
}

impl SqliteDecisionLogStore {
    /// Create a new store, creating the database file and tables if needed
    pub fn new(path: &Path) -> Result<Self, DecisionLogError> {
        let conn =
            Connection::open(path).map_err(|e| DecisionLogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, DecisionLogError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DecisionLogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DecisionLogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS decision_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id TEXT NOT NULL,
                agent TEXT NOT NULL,
                decision TEXT NOT NULL,
                confidence REAL NOT NULL,
                explanation TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_decision_log_ticket_id ON decision_log(ticket_id);
            CREATE INDEX IF NOT EXISTS idx_decision_log_timestamp ON decision_log(timestamp);
            "#,
        )
        .map_err(|e| DecisionLogError::Database(e.to_string()))
    }

    fn build_where_clause(filter: &DecisionLogFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref ticket_id) = filter.ticket_id {
            conditions.push("ticket_id = ?");
            params.push(Box::new(ticket_id.clone()));
        }

        if let Some(agent) = filter.agent {
            conditions.push("agent = ?");
            params.push(Box::new(agent.as_str().to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }
}

impl HealthCheck for SqliteDecisionLogStore {
    fn health(&self) -> CollaboratorHealth {
        match self.conn.try_lock() {
            Ok(conn) => CollaboratorHealth::from_probe(&conn),
            // Held by a writer or a query
            Err(_) => CollaboratorHealth::Connecting,
        }
    }
}

impl DecisionLogStore for SqliteDecisionLogStore {
    fn insert(&self, entry: &DecisionLogEntry) -> Result<i64, DecisionLogError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO decision_log (ticket_id, agent, decision, confidence, explanation, timestamp) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                entry.ticket_id,
                entry.agent.as_str(),
                entry.decision,
                entry.confidence,
                entry.explanation,
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )
        .map_err(|e| DecisionLogError::Database(e.to_string()))?;

        Ok(conn.last_insert_rowid())
    }

    fn query(&self, filter: &DecisionLogFilter) -> Result<Vec<DecisionLogEntry>, DecisionLogError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        // Records of one run share a timestamp; id breaks the tie
        let sql = format!(
            "SELECT id, ticket_id, agent, decision, confidence, explanation, timestamp FROM decision_log {} ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?",
            where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DecisionLogError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        // SQLite treats a negative LIMIT as no limit
        all_params.push(Box::new(filter.effective_limit().unwrap_or(-1)));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(|e| DecisionLogError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row_result in rows {
            let (id, ticket_id, agent, decision, confidence, explanation, timestamp_str) =
                row_result.map_err(|e| DecisionLogError::Database(e.to_string()))?;

            let agent: AgentKind = agent.parse().map_err(DecisionLogError::Corrupt)?;
            let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&timestamp_str)
                .map_err(|e| DecisionLogError::Corrupt(format!("Invalid timestamp: {}", e)))?
                .into();

            entries.push(DecisionLogEntry {
                id,
                ticket_id,
                agent,
                decision,
                confidence,
                explanation,
                timestamp,
            });
        }

        Ok(entries)
    }

    fn count(&self, filter: &DecisionLogFilter) -> Result<i64, DecisionLogError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM decision_log {}", where_clause);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| DecisionLogError::Database(e.to_string()))
    }
}
