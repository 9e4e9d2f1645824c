//! Storage abstractions for ingested records.
//!
//! Every pipeline ends in one or more sinks:
//! - `SqliteSink`: one flat table per entity inside a `Database` session
//! - `TextFileSink`: one record per line in a plain text file
//!
//! ## Write modes
//!
//! ```text
//! Append   INSERT every record                  (word list)
//! Upsert   INSERT .. ON CONFLICT DO UPDATE      (match history)
//! Replace  DROP + CREATE + INSERT               (hero lookup, ticket dumps)
//! ```

pub mod local;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::{LineRecord, TextFileSink};
pub use sqlite::{Database, SqliteSink, TableRow};

/// How a sink treats rows already present in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Append,
    Upsert,
    Replace,
}

/// Metadata about a sink write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of records written
    pub written: usize,
    /// Table or file that received them
    pub location: String,
}

impl WriteMetadata {
    pub fn new(written: usize, location: impl Into<String>) -> Self {
        Self {
            written,
            location: location.into(),
        }
    }
}

/// Trait for record persistence backends.
#[async_trait]
pub trait RecordSink<T: Sync>: Send + Sync {
    /// Persist one ordered batch.
    async fn write(&self, records: &[T]) -> Result<WriteMetadata>;

    /// Human-readable target description for logs.
    fn location(&self) -> String;
}
