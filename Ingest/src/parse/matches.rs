// src/parse/matches.rs

//! Match history table parser.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{MatchRecord, MatchesConfig, Outcome};
use crate::parse::coerce;
use crate::parse::{ParsePolicy, Parsed, RecordContext, collect_records, parse_selector};

const SOURCE: &str = "match history";

/// Parses match history pages using the configured selectors.
#[derive(Debug)]
pub struct MatchPageParser {
    table: Selector,
    row: Selector,
    cell: Selector,
    match_link: Selector,
    hero: Selector,
    kda: Selector,
    time: Selector,
    outcome_rules: Vec<(Selector, Outcome)>,
    ranked_marker: String,
    duration_column: usize,
    policy: ParsePolicy,
}

impl MatchPageParser {
    /// Compile all selectors up front.
    pub fn new(config: &MatchesConfig) -> Result<Self> {
        let selectors = &config.selectors;
        let outcome_rules = selectors
            .outcome_rules
            .iter()
            .map(|rule| Ok((parse_selector(&rule.selector)?, rule.outcome)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            table: parse_selector(&selectors.table)?,
            row: parse_selector(&selectors.row)?,
            cell: parse_selector("td")?,
            match_link: parse_selector(&selectors.match_link)?,
            hero: parse_selector(&selectors.hero)?,
            kda: parse_selector(&selectors.kda)?,
            time: parse_selector(&selectors.time)?,
            outcome_rules,
            ranked_marker: selectors.ranked_marker.clone(),
            duration_column: config.duration_column,
            policy: config.on_malformed,
        })
    }

    /// Parse every data row of the history table on one page.
    ///
    /// A page without the table yields an empty result.
    pub fn parse_page(&self, html: &str, page: u32) -> Result<Parsed<MatchRecord>> {
        let document = Html::parse_document(html);
        let Some(table) = document.select(&self.table).next() else {
            log::debug!("No match table on page {}", page);
            return Ok(Parsed::empty());
        };

        // first row is the header
        let results = table
            .select(&self.row)
            .enumerate()
            .skip(1)
            .map(|(index, row)| {
                let ctx = RecordContext::new(SOURCE, format!("page {page} row {index}"));
                self.parse_row(row, &ctx)
            });

        collect_records(results, self.policy)
    }

    fn parse_row(&self, row: ElementRef<'_>, ctx: &RecordContext<'_>) -> Result<MatchRecord> {
        let href = row
            .select(&self.match_link)
            .next()
            .and_then(|link| link.value().attr("href"));
        let id = ctx.field("match_id", coerce::trailing_id(ctx.required("match_id", href)?))?;

        let hero = row
            .select(&self.hero)
            .next()
            .and_then(|img| img.value().attr("title"));
        let hero = ctx.required("hero", hero)?.to_string();

        let outcome = derive_outcome(row, &self.outcome_rules);
        let ranked = row.html().contains(&self.ranked_marker);

        let duration_text = row
            .select(&self.cell)
            .nth(self.duration_column)
            .map(|cell| cell.text().collect::<String>());
        let duration = ctx.required("duration", duration_text.as_deref())?;
        let duration_minutes = ctx.field("duration", coerce::duration_minutes(duration))?;

        let kda_text = row
            .select(&self.kda)
            .next()
            .map(|el| el.text().collect::<String>());
        let kda = ctx.required("kda", kda_text.as_deref())?;
        let (kills, deaths, assists) = ctx.field("kda", coerce::kda(kda))?;

        let datetime = row
            .select(&self.time)
            .next()
            .and_then(|t| t.value().attr("datetime"));
        let played_at = ctx.field(
            "date",
            coerce::date_time_without_offset(ctx.required("date", datetime)?),
        )?;

        Ok(MatchRecord {
            id,
            hero,
            outcome,
            ranked,
            duration_minutes,
            kills,
            deaths,
            assists,
            played_at,
        })
    }
}

/// First rule whose marker is present in the row; `Unknown` when none is.
pub fn derive_outcome(row: ElementRef<'_>, rules: &[(Selector, Outcome)]) -> Outcome {
    rules
        .iter()
        .find(|(marker, _)| row.select(marker).next().is_some())
        .map(|(_, outcome)| *outcome)
        .unwrap_or(Outcome::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn row_html(id: u64, result_class: &str, mode: &str, duration: &str, kda: &str) -> String {
        format!(
            r#"<tr>
              <td class="cell-icon"><img class="image-hero" title="Axe" src="/axe.png"></td>
              <td class="cell-large"><a href="/matches/{id}">Axe</a></td>
              <td><a class="{result_class}" href="/matches/{id}">Result</a>
                  <time datetime="2013-07-21T18:04:12+00:00">2013</time></td>
              <td>{mode}</td>
              <td>All Pick</td>
              <td>{duration}</td>
              <td><span class="kda-record">{kda}</span></td>
            </tr>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<html><body><div class="content-inner"><section><section><article>
              <table>
                <tr><th>Hero</th><th>Match</th><th>Result</th><th>Type</th><th>Mode</th><th>Duration</th><th>KDA</th></tr>
                {}
              </table>
            </article></section></section></div></body></html>"#,
            rows.join("\n")
        )
    }

    fn parser() -> MatchPageParser {
        MatchPageParser::new(&MatchesConfig::default()).unwrap()
    }

    fn rules(config: &MatchesConfig) -> Vec<(Selector, Outcome)> {
        config
            .selectors
            .outcome_rules
            .iter()
            .map(|r| (Selector::parse(&r.selector).unwrap(), r.outcome))
            .collect()
    }

    #[test]
    fn test_parse_page() {
        let html = page(&[
            row_html(101, "won", "Ranked Matchmaking", "42:10", "10/2/7"),
            row_html(100, "lost", "Normal Matchmaking", "1:02:30", "1/9/3"),
        ]);
        let parsed = parser().parse_page(&html, 1).unwrap();

        assert_eq!(parsed.records.len(), 2);
        let first = &parsed.records[0];
        assert_eq!(first.id, 101);
        assert_eq!(first.hero, "Axe");
        assert_eq!(first.outcome, Outcome::Won);
        assert!(first.ranked);
        assert_eq!(first.duration_minutes, 43);
        assert_eq!((first.kills, first.deaths, first.assists), (10, 2, 7));
        assert_eq!(first.played_at.to_string(), "2013-07-21 18:04:12");

        let second = &parsed.records[1];
        assert_eq!(second.outcome, Outcome::Lost);
        assert!(!second.ranked);
        assert_eq!(second.duration_minutes, 63);
    }

    #[test]
    fn test_missing_table_is_empty() {
        let parsed = parser().parse_page("<html><body>rate limited</body></html>", 2).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_malformed_row_aborts_by_default() {
        let html = page(&[
            row_html(101, "won", "Ranked", "42:10", "10/2/7"),
            row_html(102, "won", "Ranked", "soon", "10/2/7"),
        ]);
        let err = parser().parse_page(&html, 1).unwrap_err();
        match err {
            AppError::MalformedRecord { field, record, .. } => {
                assert_eq!(field, "duration");
                assert_eq!(record, "page 1 row 2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_row_collected_when_configured() {
        let mut config = MatchesConfig::default();
        config.on_malformed = ParsePolicy::Collect;
        let parser = MatchPageParser::new(&config).unwrap();

        let html = page(&[
            row_html(101, "won", "Ranked", "42:10", "10/2"),
            row_html(102, "won", "Ranked", "42:10", "3/3/3"),
        ]);
        let parsed = parser.parse_page(&html, 1).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].id, 102);
        assert_eq!(parsed.malformed_count(), 1);
    }

    #[test]
    fn test_outcome_priority_lost_before_won() {
        let config = MatchesConfig::default();
        let html = Html::parse_fragment(
            r#"<table><tr><td><a class="won">W</a><a class="lost">L</a></td></tr></table>"#,
        );
        let row_sel = Selector::parse("tr").unwrap();
        let row = html.select(&row_sel).next().unwrap();
        assert_eq!(derive_outcome(row, &rules(&config)), Outcome::Lost);
    }

    #[test]
    fn test_outcome_unknown_without_marker() {
        let config = MatchesConfig::default();
        let html = Html::parse_fragment(r#"<table><tr><td>-</td></tr></table>"#);
        let row_sel = Selector::parse("tr").unwrap();
        let row = html.select(&row_sel).next().unwrap();
        assert_eq!(derive_outcome(row, &rules(&config)), Outcome::Unknown);
    }

    #[test]
    fn test_abandoned_outcome() {
        let html = page(&[row_html(7, "abandoned", "Ranked", "3:00", "0/0/0")]);
        let parsed = parser().parse_page(&html, 1).unwrap();
        assert_eq!(parsed.records[0].outcome, Outcome::Abandoned);
    }
}
