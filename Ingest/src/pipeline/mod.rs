//! Pipeline entry points for the ingestion runs.
//!
//! - `run_matches`: Paginated match history into an upserted table
//! - `run_heroes`: Hero index into a replaced lookup table
//! - `run_tickets`: Ticket export dumps into a replaced table
//! - `run_words`: Tagged word list into a word file and table

pub mod dedup;
pub mod filter;
pub mod heroes;
pub mod matches;
pub mod paginate;
pub mod tickets;
pub mod words;

use std::path::Path;

use crate::error::Result;
use crate::models::RunStats;
use crate::utils::log as runlog;

pub use dedup::{Deduplicator, UniqueByExt};
pub use filter::{Predicate, RecordFilter, TagFilter, WatermarkFilter, filter_records};
pub use heroes::run_heroes;
pub use matches::run_matches;
pub use paginate::{FetchOptions, drive_pages};
pub use tickets::run_tickets;
pub use words::run_words;

/// Log the closing summary of a run.
pub fn report(stats: &RunStats) {
    runlog::summary(&stats.pipeline, &stats.summary_items());
}

/// Write run statistics as pretty JSON.
pub fn write_stats(stats: &RunStats, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, json)?;
    log::info!("Run statistics saved to {}", path.display());
    Ok(())
}
