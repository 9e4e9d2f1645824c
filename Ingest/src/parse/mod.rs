// src/parse/mod.rs

//! Record parsers.
//!
//! Each source format has its own parser turning raw records (HTML rows,
//! CSV records, word list lines) into typed entities:
//! - `MatchPageParser`: match history table rows
//! - `HeroListParser`: hero index grid
//! - `parse_ticket_csv`: ticket tracker exports
//! - `parse_word_list`: tagged dictionary lines
//!
//! Required fields that cannot be coerced produce `AppError::MalformedRecord`;
//! what happens next is decided by the source's `ParsePolicy`.

pub mod coerce;
mod heroes;
mod matches;
mod tickets;
mod words;

use std::fmt;

use csv::{ByteRecord, StringRecord};
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Outcome;

pub use coerce::CoerceError;
pub use heroes::HeroListParser;
pub use matches::{MatchPageParser, derive_outcome};
pub use tickets::{TicketColumns, parse_ticket_csv};
pub use words::{parse_word_list, parse_word_record};

/// What to do when a record fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Stop at the first malformed record and fail the run
    Abort,
    /// Skip malformed records and report them at the end
    Collect,
}

/// Maps the presence of a marker element to an outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutcomeRule {
    pub selector: String,
    pub outcome: Outcome,
}

impl OutcomeRule {
    pub fn new(selector: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            selector: selector.into(),
            outcome,
        }
    }
}

/// Entities parsed from one source, plus the records that were skipped.
#[derive(Debug)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub failures: Vec<AppError>,
}

impl<T> Parsed<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn malformed_count(&self) -> usize {
        self.failures.len()
    }

    /// Append another source's results, keeping order.
    pub fn extend(&mut self, other: Parsed<T>) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Gather per-record results under `policy`.
///
/// Errors other than `MalformedRecord` (I/O, CSV framing) always abort.
pub fn collect_records<T, I>(results: I, policy: ParsePolicy) -> Result<Parsed<T>>
where
    I: IntoIterator<Item = Result<T>>,
{
    let mut parsed = Parsed::empty();
    for result in results {
        match result {
            Ok(record) => parsed.records.push(record),
            Err(error) if error.is_malformed_record() && policy == ParsePolicy::Collect => {
                log::warn!("Skipping record: {}", error);
                parsed.failures.push(error);
            }
            Err(error) => return Err(error),
        }
    }
    Ok(parsed)
}

/// Locates a raw record inside its source for error reporting.
#[derive(Debug, Clone)]
pub struct RecordContext<'a> {
    source_name: &'a str,
    record: String,
}

impl<'a> RecordContext<'a> {
    pub fn new(source_name: &'a str, record: impl fmt::Display) -> Self {
        Self {
            source_name,
            record: record.to_string(),
        }
    }

    pub fn malformed(&self, field: &str, reason: impl fmt::Display) -> AppError {
        AppError::malformed(self.source_name, self.record.clone(), field, reason)
    }

    /// Attach record context to a coercion result.
    pub fn field<T>(&self, field: &str, value: std::result::Result<T, CoerceError>) -> Result<T> {
        value.map_err(|e| self.malformed(field, e))
    }

    /// A present, non-blank value.
    pub fn required<'v>(&self, field: &str, value: Option<&'v str>) -> Result<&'v str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v),
            Some(_) => Err(self.malformed(field, CoerceError::Blank)),
            None => Err(self.malformed(field, "missing")),
        }
    }
}

/// Decode one delimited record as UTF-8.
///
/// Invalid bytes make only this record malformed, so the source's policy
/// decides whether the run goes on.
pub(crate) fn decode_record(record: ByteRecord, ctx: &RecordContext<'_>) -> Result<StringRecord> {
    StringRecord::from_byte_record(record).map_err(|e| ctx.malformed("encoding", e.utf8_error()))
}

/// Compile a CSS selector, mapping failures to `AppError::Selector`.
pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
