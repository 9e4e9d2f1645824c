//! Per-run counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Pipeline name (`matches`, `heroes`, `tickets`, `words`)
    pub pipeline: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages or files read
    pub sources_read: usize,

    /// Records successfully parsed
    pub parsed: usize,

    /// Records left after filtering and deduplication
    pub accepted: usize,

    /// Records handed to the sink
    pub written: usize,

    /// Records rejected by the parser
    pub malformed: usize,
}

impl RunStats {
    pub fn start(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            started_at: Utc::now(),
            finished_at: None,
            sources_read: 0,
            parsed: 0,
            accepted: 0,
            written: 0,
            malformed: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in milliseconds, once finished.
    pub fn elapsed_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    /// Key/value pairs for the summary log.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        let mut items = vec![
            ("Sources read", self.sources_read.to_string()),
            ("Parsed", self.parsed.to_string()),
            ("Accepted", self.accepted.to_string()),
            ("Written", self.written.to_string()),
            ("Malformed", self.malformed.to_string()),
        ];
        if let Some(ms) = self.elapsed_ms() {
            items.push(("Elapsed", format!("{ms} ms")));
        }
        items
    }
}
