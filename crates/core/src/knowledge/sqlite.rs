//! SQLite-backed knowledge article store.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};

use crate::health::{CollaboratorHealth, HealthCheck};

use super::{CreateArticleRequest, KnowledgeArticle, KnowledgeError, KnowledgeLookup};

/// Local article store. Also usable directly as a [`KnowledgeLookup`].
pub struct SqliteKnowledgeStore {
    conn: Mutex<Connection>,
}

impl SqliteKnowledgeStore {
    /// Open (or create) a file-backed store.
    pub fn new(path: &Path) -> Result<Self, KnowledgeError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, KnowledgeError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), KnowledgeError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS knowledge_articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Store a new article.
    pub fn create_article(
        &self,
        request: CreateArticleRequest,
    ) -> Result<KnowledgeArticle, KnowledgeError> {
        let conn = self.conn.lock().unwrap();

        let tags_json = serde_json::to_string(&request.tags)
            .map_err(|e| KnowledgeError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO knowledge_articles (title, content, tags, created_at) VALUES (?, ?, ?, ?)",
            params![request.title, request.content, tags_json, Utc::now().to_rfc3339()],
        )?;

        Ok(KnowledgeArticle {
            title: request.title,
            content: request.content,
            tags: request.tags,
        })
    }

    /// Case-insensitive substring search over title, content and tags.
    ///
    /// An empty query returns every article. Results are in insertion order.
    /// Query and stored text are both folded with Rust's Unicode lowercasing.
    pub fn search_articles(&self, query: &str) -> Result<Vec<KnowledgeArticle>, KnowledgeError> {
        let conn = self.conn.lock().unwrap();
        let needle = query.trim().to_lowercase();

        let mut stmt = conn
            .prepare("SELECT title, content, tags FROM knowledge_articles ORDER BY id ASC")?;
        let rows = stmt.query_map([], Self::row_to_article)?;

        let mut articles = Vec::new();
        for row in rows {
            let article = row?;
            if needle.is_empty() || Self::matches(&article, &needle) {
                articles.push(article);
            }
        }

        Ok(articles)
    }

    fn matches(article: &KnowledgeArticle, needle: &str) -> bool {
        article.title.to_lowercase().contains(needle)
            || article.content.to_lowercase().contains(needle)
            || article
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }

    fn row_to_article(row: &rusqlite::Row) -> rusqlite::Result<KnowledgeArticle> {
        let title: String = row.get(0)?;
        let content: String = row.get(1)?;
        let tags_json: String = row.get(2)?;
        let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();

        Ok(KnowledgeArticle {
            title,
            content,
            tags,
        })
    }
}

#[async_trait]
impl KnowledgeLookup for SqliteKnowledgeStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn search(&self, query: &str) -> Result<Vec<KnowledgeArticle>, KnowledgeError> {
        self.search_articles(query)
    }
}

impl HealthCheck for SqliteKnowledgeStore {
    fn health(&self) -> CollaboratorHealth {
        match self.conn.try_lock() {
            Ok(conn) => CollaboratorHealth::from_probe(&conn),
            Err(_) => CollaboratorHealth::Connecting,
        }
    }
}
