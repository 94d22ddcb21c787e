//! Knowledge base lookup used by the resolver.
//!
//! Two backends: a remote knowledge service reached over HTTP and a local
//! SQLite article store that also backs the `/knowledge` API.

mod http;
mod sqlite;
mod types;

pub use http::HttpKnowledgeClient;
pub use sqlite::SqliteKnowledgeStore;
pub use types::*;
