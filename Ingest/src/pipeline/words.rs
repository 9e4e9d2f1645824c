// src/pipeline/words.rs

//! Word list pipeline.

use std::fs::File;
use std::io::BufReader;

use crate::error::Result;
use crate::models::{RunStats, TaggedWord, WordsConfig};
use crate::parse::parse_word_list;
use crate::pipeline::dedup::UniqueByExt;
use crate::pipeline::filter::{TagFilter, filter_records};
use crate::storage::{Database, RecordSink, SqliteSink, TextFileSink, WriteMode};
use crate::utils::log as runlog;

/// Filter a tagged word list into a plain word file and the word table.
pub async fn run_words(config: &WordsConfig, db: &Database) -> Result<RunStats> {
    let mut stats = RunStats::start("words");
    runlog::header("Word list filtering");

    runlog::step(1, 3, &format!("Parsing {}", config.input));
    let reader = BufReader::new(File::open(&config.input)?);
    let parsed = parse_word_list(reader, &config.input, config.on_malformed)?;
    stats.sources_read = 1;
    stats.parsed = parsed.records.len();
    stats.malformed = parsed.malformed_count();

    runlog::step(2, 3, "Filtering by tags");
    let filter = TagFilter::new(&config.include_tags, &config.exclude_tags);
    let words: Vec<TaggedWord> = filter_records(parsed.records, &filter)
        .unique_by(|word| word.text.clone())
        .take(config.limit.unwrap_or(usize::MAX))
        .collect();
    stats.accepted = words.len();

    runlog::step(3, 3, "Writing results");
    let file = TextFileSink::new(&config.output);
    file.write(&words).await?;

    let table = SqliteSink::<TaggedWord>::new(db, &config.table, WriteMode::Append);
    let meta = table.write(&words).await?;
    stats.written = meta.written;

    stats.finish();
    Ok(stats)
}
