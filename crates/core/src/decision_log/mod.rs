//! Append-only decision log.
//!
//! Pipeline runs hand their decision records to a [`DecisionLogHandle`],
//! which forwards them over a bounded channel to a [`DecisionLogWriter`]
//! task. Callers never wait for, or observe failures of, the write.

mod handle;
mod sqlite;
mod store;
mod types;
mod writer;

pub use handle::*;
pub use sqlite::*;
pub use store::*;
pub use types::*;
pub use writer::*;
