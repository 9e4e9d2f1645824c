// src/pipeline/paginate.rs

//! Paginated source driver.
//!
//! Pages are fetched with bounded prefetch but always processed in the order
//! given: parse, empty check, filter, dedup, write. Every page is written
//! before the next one is processed.

use std::hash::Hash;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, RunStats};
use crate::parse::Parsed;
use crate::pipeline::dedup::Deduplicator;
use crate::pipeline::filter::{RecordFilter, filter_records};
use crate::services::PageSource;
use crate::storage::RecordSink;

/// Fetch settings for a paginated run.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Pages fetched ahead of the one being processed
    pub max_concurrent: usize,
    /// Pause after each fetch
    pub delay: Duration,
}

impl From<&HttpConfig> for FetchOptions {
    fn from(config: &HttpConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent.max(1),
            delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Page numbers from `last` down to `first`, both inclusive.
pub fn descending_pages(first: u32, last: u32) -> Vec<u32> {
    (first..=last).rev().collect()
}

/// Drive one paginated source into a sink.
///
/// An empty parse result on any page aborts the run with `EmptyPage`; pages
/// already written stay persisted.
#[allow(clippy::too_many_arguments)]
pub async fn drive_pages<T, S, P, F, KF, K, W>(
    source: &S,
    pages: Vec<u32>,
    options: FetchOptions,
    parse: P,
    filter: &F,
    key: KF,
    sink: &W,
    stats: &mut RunStats,
) -> Result<()>
where
    T: Sync,
    S: PageSource + ?Sized,
    P: Fn(&str, u32) -> Result<Parsed<T>>,
    F: RecordFilter<T>,
    KF: Fn(&T) -> K,
    K: Eq + Hash,
    W: RecordSink<T> + ?Sized,
{
    let total = pages.len();
    let delay = options.delay;
    let mut dedup = Deduplicator::new();

    let mut bodies = stream::iter(pages)
        .map(|page| async move {
            let body = source.fetch_page(page).await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            (page, body)
        })
        .buffered(options.max_concurrent.max(1));

    let mut done = 0;
    while let Some((page, body)) = bodies.next().await {
        let body = body?;
        stats.sources_read += 1;
        done += 1;

        let parsed = parse(&body, page)?;
        stats.malformed += parsed.malformed_count();
        if parsed.is_empty() {
            log::error!("Page {} of {} yielded no records", page, source.name());
            return Err(AppError::empty_page(source.name(), page));
        }
        stats.parsed += parsed.records.len();

        let fresh = dedup.retain_first(filter_records(parsed.records, filter), &key);
        stats.accepted += fresh.len();
        log::info!(
            "Page {} ({}/{}): {} new records",
            page,
            done,
            total,
            fresh.len()
        );
        if fresh.is_empty() {
            continue;
        }

        let meta = sink.write(&fresh).await?;
        stats.written += meta.written;
    }

    Ok(())
}
