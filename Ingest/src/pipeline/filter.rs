//! Record filters.
//!
//! Filters are predicates over parsed entities. They compose with `and`
//! and are applied lazily with `filter_records`.

use std::collections::BTreeSet;

use crate::models::{MatchRecord, TaggedWord};

/// Entities with a monotonically comparable id.
pub trait Identified {
    fn record_id(&self) -> u64;
}

impl Identified for MatchRecord {
    fn record_id(&self) -> u64 {
        self.id
    }
}

/// Entities carrying a tag set.
pub trait Tagged {
    fn tags(&self) -> &BTreeSet<String>;
}

impl Tagged for TaggedWord {
    fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// A predicate deciding whether a record continues down the pipeline.
pub trait RecordFilter<T> {
    fn accepts(&self, record: &T) -> bool;

    /// Both filters must accept.
    fn and<F>(self, other: F) -> And<Self, F>
    where
        Self: Sized,
        F: RecordFilter<T>,
    {
        And(self, other)
    }
}

/// Logical AND of two filters.
#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

impl<T, A, B> RecordFilter<T> for And<A, B>
where
    A: RecordFilter<T>,
    B: RecordFilter<T>,
{
    fn accepts(&self, record: &T) -> bool {
        self.0.accepts(record) && self.1.accepts(record)
    }
}

/// Adapts a closure into a filter.
#[derive(Debug, Clone)]
pub struct Predicate<F>(pub F);

impl<T, F> RecordFilter<T> for Predicate<F>
where
    F: Fn(&T) -> bool,
{
    fn accepts(&self, record: &T) -> bool {
        (self.0)(record)
    }
}

/// Keeps records carrying every required tag and none of the excluded ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    required: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

impl TagFilter {
    pub fn new<R, X, S>(required: R, excluded: X) -> Self
    where
        R: IntoIterator<Item = S>,
        X: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }
}

impl<T: Tagged> RecordFilter<T> for TagFilter {
    fn accepts(&self, record: &T) -> bool {
        let tags = record.tags();
        self.required.is_subset(tags) && self.excluded.is_disjoint(tags)
    }
}

/// Keeps records strictly newer than a previously ingested id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkFilter {
    watermark: u64,
}

impl WatermarkFilter {
    pub fn new(watermark: u64) -> Self {
        Self { watermark }
    }
}

impl<T: Identified> RecordFilter<T> for WatermarkFilter {
    fn accepts(&self, record: &T) -> bool {
        record.record_id() > self.watermark
    }
}

/// Lazily keep the records accepted by `filter`.
pub fn filter_records<'f, T, I, F>(records: I, filter: &'f F) -> impl Iterator<Item = T> + 'f
where
    I: IntoIterator<Item = T>,
    I::IntoIter: 'f,
    F: RecordFilter<T>,
{
    records.into_iter().filter(move |record| filter.accepts(record))
}
