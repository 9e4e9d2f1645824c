// src/parse/tickets.rs

//! Ticket tracker CSV export parser.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{AppError, Result};
use crate::models::Ticket;
use crate::parse::coerce;
use crate::parse::{ParsePolicy, Parsed, RecordContext, collect_records, decode_record};

const ISSUE_KEY: &str = "Issue key";
const ISSUE_ID: &str = "Issue id";
const PARENT_ID: &str = "Parent id";
const SUMMARY: &str = "Summary";
const ASSIGNEE: &str = "Assignee";
const SPRINT: &str = "Sprint";
const STORY_POINTS: &str = "Custom field (Story Points)";
const STATUS: &str = "Status";
const UPDATED: &str = "Updated";

/// Column positions resolved once from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketColumns {
    key: usize,
    issue_id: usize,
    status: usize,
    parent_id: Option<usize>,
    summary: Option<usize>,
    assignee: Option<usize>,
    sprint: Option<usize>,
    story_points: Option<usize>,
    updated: Option<usize>,
}

impl TicketColumns {
    /// Resolve column names case-insensitively; the first duplicate wins.
    pub fn resolve(headers: &StringRecord, source_name: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require =
            |name: &str| find(name).ok_or_else(|| AppError::missing_column(source_name, name));

        Ok(Self {
            key: require(ISSUE_KEY)?,
            issue_id: require(ISSUE_ID)?,
            status: require(STATUS)?,
            parent_id: find(PARENT_ID),
            summary: find(SUMMARY),
            assignee: find(ASSIGNEE),
            sprint: find(SPRINT),
            story_points: find(STORY_POINTS),
            updated: find(UPDATED),
        })
    }

    fn get<'r>(record: &'r StringRecord, column: Option<usize>) -> &'r str {
        column.and_then(|i| record.get(i)).unwrap_or("")
    }

    fn parse(
        &self,
        record: &StringRecord,
        ctx: &RecordContext<'_>,
        sprint_prefix: &str,
    ) -> Result<Ticket> {
        let key = ctx.required(ISSUE_KEY, record.get(self.key))?.to_string();
        let issue_id = ctx.field(
            ISSUE_ID,
            coerce::required_u64(ctx.required(ISSUE_ID, record.get(self.issue_id))?),
        )?;
        let issue_id = i64::try_from(issue_id)
            .map_err(|_| ctx.malformed(ISSUE_ID, format!("{issue_id} is out of range")))?;
        let status = ctx.required(STATUS, record.get(self.status))?.to_string();

        let sprint = coerce::optional_text(Self::get(record, self.sprint));
        let sprint_number = coerce::sprint_number(sprint.as_deref(), sprint_prefix);
        let updated = ctx.field(UPDATED, coerce::export_date(Self::get(record, self.updated)))?;

        Ok(Ticket {
            issue_id,
            key,
            parent_id: coerce::optional_int_from_float(Self::get(record, self.parent_id)),
            summary: coerce::optional_text(Self::get(record, self.summary)),
            assignee: coerce::optional_text(Self::get(record, self.assignee)),
            sprint,
            sprint_number,
            story_points: coerce::optional_f64(Self::get(record, self.story_points)),
            status,
            updated,
        })
    }
}

/// Parse one CSV export. The first record is the header.
pub fn parse_ticket_csv<R: Read>(
    reader: R,
    source_name: &str,
    sprint_prefix: &str,
    policy: ParsePolicy,
) -> Result<Parsed<Ticket>> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = TicketColumns::resolve(csv.headers()?, source_name)?;

    let results = csv.byte_records().map(|record| {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let ctx = RecordContext::new(source_name, format!("line {line}"));
        columns.parse(&decode_record(record, &ctx)?, &ctx, sprint_prefix)
    });

    collect_records(results, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "TTKG2 Sprint ";

    const EXPORT: &str = "\
Summary,Issue key,Issue id,Parent id,Assignee,Sprint,Sprint,Custom field (Story Points),Status,Updated
Fix login,TT-1,10001,,alice,TTKG2 Sprint 14,TTKG2 Sprint 13,3,Done,12/Mar/24 3:15 PM
Write docs,TT-2,10002,10001.0,,,,lots,In Progress,02/Apr/24 9:00 AM
Plan release,TT-3,10003,,bob,Backlog,,,To Do,
";

    fn parse(input: &str, policy: ParsePolicy) -> Result<Parsed<Ticket>> {
        parse_ticket_csv(input.as_bytes(), "export.csv", PREFIX, policy)
    }

    #[test]
    fn test_parse_three_rows() {
        let parsed = parse(EXPORT, ParsePolicy::Collect).unwrap();
        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.malformed_count(), 0);

        let first = &parsed.records[0];
        assert_eq!(first.key, "TT-1");
        assert_eq!(first.issue_id, 10001);
        assert_eq!(first.parent_id, None);
        assert_eq!(first.sprint.as_deref(), Some("TTKG2 Sprint 14"));
        assert_eq!(first.sprint_number, Some(14));
        assert_eq!(first.story_points, Some(3.0));
        assert_eq!(first.updated, chrono::NaiveDate::from_ymd_opt(2024, 3, 12));

        let second = &parsed.records[1];
        assert_eq!(second.parent_id, Some(10001));
        assert_eq!(second.assignee, None);
        assert_eq!(second.story_points, None);
        assert_eq!(second.sprint, None);

        let third = &parsed.records[2];
        assert_eq!(third.sprint_number, None);
        assert_eq!(third.updated, None);
    }

    #[test]
    fn test_header_case_insensitive() {
        let input = "ISSUE KEY , issue id,STATUS\nTT-9,9,Done\n";
        let parsed = parse(input, ParsePolicy::Abort).unwrap();
        assert_eq!(parsed.records[0].issue_id, 9);
        assert_eq!(parsed.records[0].summary, None);
    }

    #[test]
    fn test_missing_required_column_rejected_eagerly() {
        let input = "Issue key,Status\nTT-1,Done\n";
        let err = parse(input, ParsePolicy::Collect).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn { ref column, .. } if column == ISSUE_ID));
    }

    #[test]
    fn test_bad_issue_id_collected() {
        let input = "Issue key,Issue id,Status\nTT-1,abc,Done\nTT-2,2,Done\n";
        let parsed = parse(input, ParsePolicy::Collect).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.malformed_count(), 1);
        assert!(parsed.failures[0].to_string().contains("line 2"));
    }

    #[test]
    fn test_bad_issue_id_aborts() {
        let input = "Issue key,Issue id,Status\nTT-1,abc,Done\n";
        assert!(parse(input, ParsePolicy::Abort).is_err());
    }

    #[test]
    fn test_invalid_utf8_row_is_collected() {
        let mut input = b"Issue key,Issue id,Status\nTT-1,1,Done\n".to_vec();
        input.extend_from_slice(b"TT-2,2,D\xffne\nTT-3,3,Done\n");

        let parsed =
            parse_ticket_csv(input.as_slice(), "export.csv", PREFIX, ParsePolicy::Collect).unwrap();
        let keys: Vec<&str> = parsed.records.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["TT-1", "TT-3"]);
        assert_eq!(parsed.malformed_count(), 1);
        assert!(matches!(
            &parsed.failures[0],
            AppError::MalformedRecord { field, record, .. } if field == "encoding" && record == "line 3"
        ));
    }

    #[test]
    fn test_bad_date_is_malformed() {
        let input = "Issue key,Issue id,Status,Updated\nTT-1,1,Done,someday\n";
        let parsed = parse(input, ParsePolicy::Collect).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.malformed_count(), 1);
    }
}
