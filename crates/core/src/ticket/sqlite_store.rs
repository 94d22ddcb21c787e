//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::agents::DecisionRecord;
use crate::health::{CollaboratorHealth, HealthCheck};
use crate::pipeline::TicketOutcome;

use super::{CreateTicketRequest, Ticket, TicketError, TicketFilter, TicketStatus, TicketStore};

const TICKET_COLUMNS: &str = "id, title, description, status, category, priority, is_routine_issue, risk_level, agent_decisions, resolution_steps, resolution_used_fallback, escalation_reason, created_at, updated_at";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                category TEXT,
                priority TEXT,
                is_routine_issue INTEGER NOT NULL DEFAULT 0,
                risk_level TEXT,
                agent_decisions TEXT NOT NULL DEFAULT '[]',
                resolution_steps TEXT NOT NULL DEFAULT '',
                resolution_used_fallback INTEGER NOT NULL DEFAULT 0,
                escalation_reason TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at);
            "#,
        )?;
        Ok(())
    }

    fn build_where_clause(filter: &TicketFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let status_str: String = row.get(3)?;
        let category_str: Option<String> = row.get(4)?;
        let priority_str: Option<String> = row.get(5)?;
        let risk_str: Option<String> = row.get(7)?;
        let decisions_json: String = row.get(8)?;
        let created_at_str: String = row.get(12)?;
        let updated_at_str: String = row.get(13)?;

        // Values are written by this store; fall back rather than fail on bad rows
        let status = status_str.parse().unwrap_or_default();
        let agent_decisions: Vec<DecisionRecord> =
            serde_json::from_str(&decisions_json).unwrap_or_default();

        Ok(Ticket {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            status,
            category: category_str.and_then(|s| s.parse().ok()),
            priority: priority_str.and_then(|s| s.parse().ok()),
            is_routine_issue: row.get(6)?,
            risk_level: risk_str.and_then(|s| s.parse().ok()),
            agent_decisions,
            resolution_steps: row.get(9)?,
            resolution_used_fallback: row.get(10)?,
            escalation_reason: row.get(11)?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }

    fn get_with(conn: &Connection, id: &str) -> Result<Option<Ticket>, TicketError> {
        let sql = format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::row_to_ticket)
            .optional()?)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl HealthCheck for SqliteTicketStore {
    fn health(&self) -> CollaboratorHealth {
        match self.conn.try_lock() {
            Ok(conn) => CollaboratorHealth::from_probe(&conn),
            Err(_) => CollaboratorHealth::Connecting,
        }
    }
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = TicketStatus::Received;

        conn.execute(
            "INSERT INTO tickets (id, title, description, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.title,
                request.description,
                status.as_str(),
                format_timestamp(&now),
                format_timestamp(&now),
            ],
        )?;

        Ok(Ticket {
            id,
            title: request.title,
            description: request.description,
            status,
            category: None,
            priority: None,
            is_routine_issue: false,
            risk_level: None,
            agent_decisions: Vec::new(),
            resolution_steps: String::new(),
            resolution_used_fallback: false,
            escalation_reason: String::new(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();
        Self::get_with(&conn, id)
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT {} FROM tickets {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            TICKET_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt.query_map(param_refs.as_slice(), Self::row_to_ticket)?;

        let mut tickets = Vec::new();
        for row_result in rows {
            tickets.push(row_result?);
        }

        Ok(tickets)
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM tickets {}", where_clause);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    fn update_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let now = Utc::now();
        let changed = conn.execute(
            "UPDATE tickets SET status = ?, updated_at = ? WHERE id = ?",
            params![status.as_str(), format_timestamp(&now), id],
        )?;

        if changed == 0 {
            return Err(TicketError::NotFound(id.to_string()));
        }

        Self::get_with(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))
    }

    fn apply_outcome(&self, id: &str, outcome: &TicketOutcome) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let current =
            Self::get_with(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        let mut decisions = current.agent_decisions;
        decisions.extend(outcome.decision_records.iter().cloned());
        let decisions_json =
            serde_json::to_string(&decisions).map_err(|e| TicketError::Database(e.to_string()))?;

        let now = Utc::now();
        conn.execute(
            "UPDATE tickets SET status = ?, category = ?, priority = ?, is_routine_issue = ?, risk_level = ?, agent_decisions = ?, resolution_steps = ?, resolution_used_fallback = ?, escalation_reason = ?, updated_at = ? WHERE id = ?",
            params![
                outcome.status.as_str(),
                outcome.classification.category.as_str(),
                outcome.classification.priority.as_str(),
                outcome.classification.is_routine_issue,
                outcome.risk.risk_level.as_str(),
                decisions_json,
                outcome.resolution.resolution_steps,
                outcome.resolution.used_fallback,
                outcome.escalation.escalation_reason,
                format_timestamp(&now),
                id,
            ],
        )?;

        Ok(Ticket {
            status: outcome.status,
            category: Some(outcome.classification.category),
            priority: Some(outcome.classification.priority),
            is_routine_issue: outcome.classification.is_routine_issue,
            risk_level: Some(outcome.risk.risk_level),
            agent_decisions: decisions,
            resolution_steps: outcome.resolution.resolution_steps.clone(),
            resolution_used_fallback: outcome.resolution.used_fallback,
            escalation_reason: outcome.escalation.escalation_reason.clone(),
            updated_at: now,
            ..current
        })
    }
}
