// src/pipeline/tickets.rs

//! Ticket dump pipeline.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::models::{RunStats, Ticket, TicketsConfig};
use crate::parse::{Parsed, parse_ticket_csv};
use crate::pipeline::dedup::UniqueByExt;
use crate::storage::{Database, RecordSink, SqliteSink, WriteMode};
use crate::utils::log as runlog;

/// Every regular file under `dir`, recursively, sorted by path.
pub fn dump_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Rebuild the ticket table from every export in the dump directory.
pub async fn run_tickets(config: &TicketsConfig, db: &Database) -> Result<RunStats> {
    let mut stats = RunStats::start("tickets");
    runlog::header("Ticket dump ingestion");

    let files = dump_files(&config.dump_dir)?;
    runlog::step(1, 2, &format!("Reading {} files from {}", files.len(), config.dump_dir));
    if files.is_empty() {
        log::warn!("No ticket dumps found in {}", config.dump_dir);
    }

    let mut parsed = Parsed::empty();
    for path in &files {
        let source_name = path.display().to_string();
        let reader = BufReader::new(File::open(path)?);
        let batch = parse_ticket_csv(reader, &source_name, &config.sprint_prefix, config.on_malformed)?;
        runlog::sub_item(&format!("{}: {} tickets", source_name, batch.records.len()));
        parsed.extend(batch);
        stats.sources_read += 1;
    }
    stats.parsed = parsed.records.len();
    stats.malformed = parsed.malformed_count();

    let tickets: Vec<Ticket> = parsed
        .records
        .into_iter()
        .unique_by(|ticket| ticket.issue_id)
        .collect();
    stats.accepted = tickets.len();

    runlog::step(2, 2, &format!("Replacing table {}", config.table));
    let sink = SqliteSink::<Ticket>::new(db, &config.table, WriteMode::Replace);
    let meta = sink.write(&tickets).await?;
    stats.written = meta.written;

    stats.finish();
    Ok(stats)
}
