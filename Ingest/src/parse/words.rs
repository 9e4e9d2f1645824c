// src/parse/words.rs

//! Tagged word list parser.
//!
//! Lines look like `word lemma tag:tag:tag`, separated by single spaces.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use crate::error::Result;
use crate::models::TaggedWord;
use crate::parse::coerce;
use crate::parse::{ParsePolicy, Parsed, RecordContext, collect_records, decode_record};

const WORD_FIELD: usize = 0;
const TAGS_FIELD: usize = 2;

/// Parse one word list line.
pub fn parse_word_record(record: &StringRecord, ctx: &RecordContext<'_>) -> Result<TaggedWord> {
    let text = ctx.required("word", record.get(WORD_FIELD))?;
    let tags = coerce::tag_set(ctx.required("tags", record.get(TAGS_FIELD))?);
    if tags.is_empty() {
        return Err(ctx.malformed("tags", "no tags after splitting on ':'"));
    }
    Ok(TaggedWord {
        text: text.to_string(),
        tags,
    })
}

/// Parse a whole word list.
pub fn parse_word_list<R: Read>(
    reader: R,
    source_name: &str,
    policy: ParsePolicy,
) -> Result<Parsed<TaggedWord>> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .flexible(true)
        .from_reader(reader);

    let results = csv.byte_records().map(|record| {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let ctx = RecordContext::new(source_name, format!("line {line}"));
        parse_word_record(&decode_record(record, &ctx)?, &ctx)
    });

    collect_records(results, policy)
}
