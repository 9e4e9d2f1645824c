// src/pipeline/heroes.rs

//! Hero lookup pipeline.

use crate::error::{AppError, Result};
use crate::models::{Hero, HeroesConfig, RunStats};
use crate::parse::HeroListParser;
use crate::pipeline::dedup::UniqueByExt;
use crate::services::PageSource;
use crate::storage::{Database, RecordSink, SqliteSink, WriteMode};
use crate::utils::log as runlog;

/// Replace the hero table with the current hero index.
///
/// An index without heroes fails with `EmptyPage` and leaves the table alone.
pub async fn run_heroes<S>(config: &HeroesConfig, db: &Database, source: &S) -> Result<RunStats>
where
    S: PageSource + ?Sized,
{
    let mut stats = RunStats::start("heroes");
    runlog::header("Hero index ingestion");

    let parser = HeroListParser::new(config)?;
    let html = source.fetch_page(1).await?;
    stats.sources_read = 1;

    let heroes = parser.parse(&html);
    if heroes.is_empty() {
        return Err(AppError::empty_page(source.name(), 1));
    }
    stats.parsed = heroes.len();

    let heroes: Vec<Hero> = heroes
        .into_iter()
        .unique_by(|hero| hero.slug.clone())
        .collect();
    stats.accepted = heroes.len();

    let sink = SqliteSink::<Hero>::new(db, &config.table, WriteMode::Replace);
    let meta = sink.write(&heroes).await?;
    stats.written = meta.written;
    runlog::sub_item(&format!("{} heroes stored in {}", meta.written, meta.location));

    stats.finish();
    Ok(stats)
}
