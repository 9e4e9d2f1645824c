//! End-to-end pipeline runs against canned pages and temporary databases.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ingest::error::{AppError, Result};
use ingest::models::{HeroesConfig, HttpConfig, MatchesConfig, TicketsConfig, WordsConfig};
use ingest::parse::ParsePolicy;
use ingest::pipeline::{run_heroes, run_matches, run_tickets, run_words};
use ingest::services::PageSource;
use ingest::storage::Database;
use rusqlite::Connection;
use tempfile::TempDir;

/// Serves fixed HTML per page and records the fetch order.
struct CannedPages {
    pages: HashMap<u32, String>,
    fetched: Mutex<Vec<u32>>,
}

impl CannedPages {
    fn new(pages: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    fn fetched(&self) -> Vec<u32> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for CannedPages {
    fn name(&self) -> String {
        "canned".to_string()
    }

    async fn fetch_page(&self, page: u32) -> Result<String> {
        self.fetched.lock().unwrap().push(page);
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}

fn match_row(id: u64, result: &str) -> String {
    format!(
        r#"<tr>
          <td><img class="image-hero" title="Lion" src="/lion.png"></td>
          <td class="cell-large"><a href="/matches/{id}">Lion</a></td>
          <td><a class="{result}" href="/matches/{id}">{result}</a>
              <time datetime="2014-01-02T03:04:05+00:00">Jan</time></td>
          <td>Ranked Matchmaking</td>
          <td>All Pick</td>
          <td>35:20</td>
          <td><span class="kda-record">4/5/6</span></td>
        </tr>"#
    )
}

fn match_page(ids: &[u64]) -> String {
    let rows: Vec<String> = ids.iter().map(|id| match_row(*id, "won")).collect();
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

fn matches_config(last_page: u32, watermark: Option<u64>) -> MatchesConfig {
    MatchesConfig {
        first_page: 1,
        last_page,
        watermark,
        ..MatchesConfig::default()
    }
}

fn http() -> HttpConfig {
    HttpConfig {
        request_delay_ms: 0,
        max_concurrent: 2,
        ..HttpConfig::default()
    }
}

fn ids_in(path: &Path, table: &str) -> Vec<i64> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare(&format!("SELECT match_id FROM {table} ORDER BY match_id"))
        .unwrap();
    let ids = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<i64>>>()
        .unwrap();
    ids
}

#[tokio::test]
async fn matches_are_stored_oldest_page_first() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("ingest.db");
    let db = Database::open(&db_path).unwrap();
    let config = matches_config(3, None);
    let source = CannedPages::new([
        (1, match_page(&[305, 304])),
        (2, match_page(&[304, 303, 302])),
        (3, match_page(&[301, 300])),
    ]);

    let stats = run_matches(&config, &http(), &db, &source).await.unwrap();

    assert_eq!(source.fetched(), vec![3, 2, 1]);
    assert_eq!(stats.sources_read, 3);
    assert_eq!(stats.parsed, 7);
    assert_eq!(stats.accepted, 6);
    assert_eq!(ids_in(&db_path, &config.table), vec![300, 301, 302, 303, 304, 305]);
}

#[tokio::test]
async fn stored_max_id_becomes_the_watermark() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("ingest.db");
    let db = Database::open(&db_path).unwrap();
    let config = matches_config(1, None);

    let first = CannedPages::new([(1, match_page(&[11, 10]))]);
    run_matches(&config, &http(), &db, &first).await.unwrap();

    let second = CannedPages::new([(1, match_page(&[13, 12, 11, 10]))]);
    let stats = run_matches(&config, &http(), &db, &second).await.unwrap();

    assert_eq!(stats.parsed, 4);
    assert_eq!(stats.accepted, 2);
    assert_eq!(ids_in(&db_path, &config.table), vec![10, 11, 12, 13]);
}

#[tokio::test]
async fn upsert_keeps_one_row_per_match() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("ingest.db");
    let db = Database::open(&db_path).unwrap();
    let config = matches_config(1, Some(0));
    let source = CannedPages::new([(1, match_page(&[7, 8]))]);

    run_matches(&config, &http(), &db, &source).await.unwrap();
    run_matches(&config, &http(), &db, &source).await.unwrap();

    assert_eq!(ids_in(&db_path, &config.table), vec![7, 8]);
}

#[tokio::test]
async fn empty_page_aborts_after_earlier_pages_are_written() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("ingest.db");
    let db = Database::open(&db_path).unwrap();
    let config = matches_config(3, Some(0));
    let source = CannedPages::new([
        (3, match_page(&[1, 2])),
        (2, "<html><body>Too many requests</body></html>".to_string()),
        (1, match_page(&[5, 6])),
    ]);

    let err = run_matches(&config, &http(), &db, &source).await.unwrap_err();

    assert!(matches!(err, AppError::EmptyPage { page: 2, .. }));
    assert_eq!(ids_in(&db_path, &config.table), vec![1, 2]);
}

#[tokio::test]
async fn empty_hero_index_leaves_table_untouched() {
    let db = Database::open_in_memory().unwrap();
    let config = HeroesConfig::default();
    let full = CannedPages::new([(
        1,
        r#"<div class="hero-grid">
             <a href="/heroes/axe"><div class="name">Axe</div></a>
             <a href="/heroes/lion"><div class="name">Lion</div></a>
             <a href="/heroes/axe"><div class="name">Axe</div></a>
           </div>"#
            .to_string(),
    )]);

    let stats = run_heroes(&config, &db, &full).await.unwrap();
    assert_eq!(stats.parsed, 3);
    assert_eq!(stats.written, 2);

    let empty = CannedPages::new([(1, "<html></html>".to_string())]);
    let err = run_heroes(&config, &db, &empty).await.unwrap_err();
    assert!(matches!(err, AppError::EmptyPage { page: 1, .. }));
    assert_eq!(db.count(&config.table).unwrap(), 2);
}

#[tokio::test]
async fn tickets_from_every_dump_file() {
    let tmp = TempDir::new().unwrap();
    let dumps = tmp.path().join("dumps");
    std::fs::create_dir_all(dumps.join("older")).unwrap();
    std::fs::write(
        dumps.join("a.csv"),
        "Issue key,Issue id,Parent id,Summary,Assignee,Sprint,Custom field (Story Points),Status,Updated\n\
         TT-1,1,,Login,alice,TTKG2 Sprint 4,3,Done,12/Mar/24 3:15 PM\n\
         TT-2,2,1.0,Docs,,,lots,To Do,\n",
    )
    .unwrap();
    std::fs::write(
        dumps.join("older/b.csv"),
        "issue key , ISSUE ID,Status\n\
         TT-1,1,Stale\n\
         TT-3,3,Done\n\
         TT-4,four,Done\n",
    )
    .unwrap();

    let db = Database::open(tmp.path().join("ingest.db")).unwrap();
    let config = TicketsConfig {
        dump_dir: dumps.display().to_string(),
        ..TicketsConfig::default()
    };

    let stats = run_tickets(&config, &db).await.unwrap();

    assert_eq!(stats.sources_read, 2);
    assert_eq!(stats.parsed, 4);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.written, 3);
    assert_eq!(db.max_id(&config.table, "issue_id").unwrap(), Some(3));
}

#[tokio::test]
async fn tickets_missing_column_fails_the_run() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("bad.csv"), "Issue key,Status\nTT-1,Done\n").unwrap();
    let db = Database::open_in_memory().unwrap();
    let config = TicketsConfig {
        dump_dir: tmp.path().display().to_string(),
        ..TicketsConfig::default()
    };

    let err = run_tickets(&config, &db).await.unwrap_err();
    assert!(matches!(err, AppError::MissingColumn { .. }));
}

#[tokio::test]
async fn words_are_filtered_deduplicated_and_limited() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("words.txt");
    let output = tmp.path().join("out/words.txt");
    std::fs::write(
        &input,
        "кіт кіт noun:anim:m:v_naz\n\
         кіт кіт noun:anim:m:v_naz:slang\n\
         кота кіт noun:anim:m:v_rod\n\
         Київ Київ noun:inanim:m:v_naz:prop:geo\n\
         кіт кіт noun:anim:m:v_naz\n\
         пес пес noun:anim:m:v_naz\n\
         дім дім noun:inanim:m:v_naz\n\
         broken\n",
    )
    .unwrap();

    let db = Database::open_in_memory().unwrap();
    let config = WordsConfig {
        input: input.display().to_string(),
        output: output.display().to_string(),
        limit: Some(2),
        on_malformed: ParsePolicy::Collect,
        ..WordsConfig::default()
    };

    let stats = run_words(&config, &db).await.unwrap();

    assert_eq!(stats.parsed, 7);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.accepted, 2);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "кіт\nпес\n");
    assert_eq!(db.count(&config.table).unwrap(), 2);
}

#[tokio::test]
async fn words_abort_policy_stops_on_short_line() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("words.txt");
    std::fs::write(&input, "кіт кіт noun:v_naz\nbroken\n").unwrap();

    let db = Database::open_in_memory().unwrap();
    let config = WordsConfig {
        input: input.display().to_string(),
        output: tmp.path().join("out.txt").display().to_string(),
        on_malformed: ParsePolicy::Abort,
        ..WordsConfig::default()
    };

    let err = run_words(&config, &db).await.unwrap_err();
    assert!(matches!(err, AppError::MalformedRecord { .. }));
    assert!(!tmp.path().join("out.txt").exists());
}
