//! SQLite storage implementation.
//!
//! A `Database` is the session object of one pipeline run. Sinks borrow it
//! and write each batch inside a single transaction.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Statement, params};

use crate::error::{AppError, Result};
use crate::models::{Hero, MatchRecord, TaggedWord, Ticket};
use crate::storage::{RecordSink, WriteMetadata, WriteMode};

/// A row type with a flat table layout.
pub trait TableRow {
    /// Column definitions used in `CREATE TABLE`.
    const SCHEMA: &'static str;

    /// Columns bound by `bind`, in order.
    const COLUMNS: &'static [&'static str];

    /// Unique column used for upserts.
    const CONFLICT_KEY: Option<&'static str> = None;

    /// Execute the prepared insert with this row's values.
    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

impl TableRow for MatchRecord {
    const SCHEMA: &'static str = "match_id INTEGER PRIMARY KEY, \
         hero TEXT NOT NULL, \
         result TEXT NOT NULL, \
         ranked INTEGER NOT NULL, \
         duration INTEGER NOT NULL, \
         kills INTEGER NOT NULL, \
         deaths INTEGER NOT NULL, \
         assists INTEGER NOT NULL, \
         date TEXT NOT NULL";
    const COLUMNS: &'static [&'static str] = &[
        "match_id", "hero", "result", "ranked", "duration", "kills", "deaths", "assists", "date",
    ];
    const CONFLICT_KEY: Option<&'static str> = Some("match_id");

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        let id = i64::try_from(self.id)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        stmt.execute(params![
            id,
            self.hero,
            self.outcome.as_str(),
            self.ranked,
            self.duration_minutes,
            self.kills,
            self.deaths,
            self.assists,
            self.played_at,
        ])
    }
}

impl TableRow for Hero {
    const SCHEMA: &'static str =
        "id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, link TEXT NOT NULL";
    const COLUMNS: &'static [&'static str] = &["name", "link"];

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.name, self.slug])
    }
}

impl TableRow for Ticket {
    const SCHEMA: &'static str = "issue_id INTEGER PRIMARY KEY, \
         key TEXT NOT NULL, \
         parent_id INTEGER, \
         summary TEXT, \
         assignee TEXT, \
         sprint TEXT, \
         sprint_num INTEGER, \
         story_points REAL, \
         status TEXT NOT NULL, \
         updated_date TEXT";
    const COLUMNS: &'static [&'static str] = &[
        "issue_id",
        "key",
        "parent_id",
        "summary",
        "assignee",
        "sprint",
        "sprint_num",
        "story_points",
        "status",
        "updated_date",
    ];
    const CONFLICT_KEY: Option<&'static str> = Some("issue_id");

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.issue_id,
            self.key,
            self.parent_id,
            self.summary,
            self.assignee,
            self.sprint,
            self.sprint_number,
            self.story_points,
            self.status,
            self.updated,
        ])
    }
}

impl TableRow for TaggedWord {
    const SCHEMA: &'static str = "text TEXT NOT NULL";
    const COLUMNS: &'static [&'static str] = &["text"];

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.text])
    }
}

/// One open SQLite connection, scoped to a pipeline run.
pub struct Database {
    conn: Mutex<Connection>,
    location: String,
}

impl Database {
    /// Open (or create) the database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        log::debug!("Opened database {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            location: path.display().to_string(),
        })
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            location: ":memory:".to_string(),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Highest value of an integer column; `None` for a missing or empty table.
    pub fn max_id(&self, table: &str, column: &str) -> Result<Option<u64>> {
        let conn = self.lock();
        if !Self::table_exists(&conn, table)? {
            return Ok(None);
        }
        let max: Option<i64> = conn.query_row(
            &format!("SELECT MAX(\"{column}\") FROM \"{table}\""),
            [],
            |row| row.get(0),
        )?;
        max.map(|id| {
            u64::try_from(id)
                .map_err(|_| AppError::validation(format!("{table}.{column} holds negative id {id}")))
        })
        .transpose()
    }

    /// Number of rows in a table; 0 when it does not exist.
    pub fn count(&self, table: &str) -> Result<usize> {
        let conn = self.lock();
        if !Self::table_exists(&conn, table)? {
            return Ok(0);
        }
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    /// Write `rows` to `table` in one transaction.
    pub fn write_rows<T: TableRow>(&self, table: &str, mode: WriteMode, rows: &[T]) -> Result<usize> {
        let sql = insert_sql::<T>(table, mode)?;
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        if mode == WriteMode::Replace {
            tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{table}\";"))?;
        }
        tx.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" ({});",
            T::SCHEMA
        ))?;

        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                row.bind(&mut stmt)?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

fn insert_sql<T: TableRow>(table: &str, mode: WriteMode) -> Result<String> {
    let columns = T::COLUMNS
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
    let insert = format!("INSERT INTO \"{table}\" ({columns}) VALUES ({placeholders})");

    if mode != WriteMode::Upsert {
        return Ok(insert);
    }

    let key = T::CONFLICT_KEY
        .ok_or_else(|| AppError::config(format!("table {table} has no upsert key")))?;
    let updates = T::COLUMNS
        .iter()
        .filter(|c| **c != key)
        .map(|c| format!("\"{c}\" = excluded.\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("{insert} ON CONFLICT(\"{key}\") DO UPDATE SET {updates}"))
}

/// Sink writing one entity type into one table of a borrowed session.
pub struct SqliteSink<'db, T> {
    db: &'db Database,
    table: String,
    mode: WriteMode,
    _row: PhantomData<fn(&T)>,
}

impl<'db, T: TableRow> SqliteSink<'db, T> {
    pub fn new(db: &'db Database, table: impl Into<String>, mode: WriteMode) -> Self {
        Self {
            db,
            table: table.into(),
            mode,
            _row: PhantomData,
        }
    }
}

#[async_trait]
impl<'db, T> RecordSink<T> for SqliteSink<'db, T>
where
    T: TableRow + Sync,
{
    async fn write(&self, records: &[T]) -> Result<WriteMetadata> {
        let written = self.db.write_rows(&self.table, self.mode, records)?;
        log::info!(
            "{:?}: {} rows written to {}",
            self.mode,
            written,
            self.location()
        );
        Ok(WriteMetadata::new(written, self.location()))
    }

    fn location(&self) -> String {
        format!("{}:{}", self.db.location(), self.table)
    }
}
