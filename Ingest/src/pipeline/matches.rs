// src/pipeline/matches.rs

//! Match history pipeline.

use crate::error::Result;
use crate::models::{HttpConfig, MatchRecord, MatchesConfig, RunStats};
use crate::parse::MatchPageParser;
use crate::pipeline::filter::WatermarkFilter;
use crate::pipeline::paginate::{FetchOptions, descending_pages, drive_pages};
use crate::services::PageSource;
use crate::storage::{Database, SqliteSink, WriteMode};
use crate::utils::log as runlog;

/// Column holding the match id.
const MATCH_ID_COLUMN: &str = "match_id";

/// Resolve the watermark: configured value, else highest stored id, else 0.
pub fn resolve_watermark(config: &MatchesConfig, db: &Database) -> Result<u64> {
    match config.watermark {
        Some(watermark) => Ok(watermark),
        None => Ok(db.max_id(&config.table, MATCH_ID_COLUMN)?.unwrap_or(0)),
    }
}

/// Ingest the match history pages newer than the watermark.
pub async fn run_matches<S>(
    config: &MatchesConfig,
    http: &HttpConfig,
    db: &Database,
    source: &S,
) -> Result<RunStats>
where
    S: PageSource + ?Sized,
{
    let mut stats = RunStats::start("matches");
    runlog::header("Match history ingestion");

    let parser = MatchPageParser::new(config)?;
    let watermark = resolve_watermark(config, db)?;
    let pages = descending_pages(config.first_page, config.last_page);
    runlog::step(
        1,
        2,
        &format!(
            "Fetching pages {}..={} of {} (watermark {})",
            config.first_page,
            config.last_page,
            source.name(),
            watermark
        ),
    );

    let filter = WatermarkFilter::new(watermark);
    let sink = SqliteSink::<MatchRecord>::new(db, &config.table, WriteMode::Upsert);

    drive_pages(
        source,
        pages,
        FetchOptions::from(http),
        |html, page| parser.parse_page(html, page),
        &filter,
        |record: &MatchRecord| record.id,
        &sink,
        &mut stats,
    )
    .await?;

    runlog::step(2, 2, &format!("Stored {} matches in {}", stats.written, config.table));
    stats.finish();
    Ok(stats)
}
