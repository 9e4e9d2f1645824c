//! Application configuration structures.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Outcome;
use crate::parse::{OutcomeRule, ParsePolicy};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Relational store location
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Match history scraping
    #[serde(default)]
    pub matches: MatchesConfig,

    /// Hero listing scraping
    #[serde(default)]
    pub heroes: HeroesConfig,

    /// Ticket dump import
    #[serde(default)]
    pub tickets: TicketsConfig,

    /// Word list filtering
    #[serde(default)]
    pub words: WordsConfig,

    /// Run report output
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.matches.first_page == 0 {
            return Err(AppError::validation("matches.first_page must be >= 1"));
        }
        if self.matches.first_page > self.matches.last_page {
            return Err(AppError::validation(
                "matches.first_page must not exceed matches.last_page",
            ));
        }
        if self.matches.selectors.outcome_rules.is_empty() {
            return Err(AppError::validation(
                "matches.selectors.outcome_rules is empty",
            ));
        }
        if self.tickets.sprint_prefix.is_empty() {
            return Err(AppError::validation("tickets.sprint_prefix is empty"));
        }
        if let Some(tag) = self
            .words
            .include_tags
            .iter()
            .find(|tag| self.words.exclude_tags.contains(tag))
        {
            return Err(AppError::validation(format!(
                "words: tag '{tag}' is both included and excluded"
            )));
        }
        if self.words.limit == Some(0) {
            return Err(AppError::validation("words.limit must be > 0 when set"));
        }

        let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
            .map_err(|e| AppError::config(e.to_string()))?;
        for (key, table) in [
            ("matches.table", &self.matches.table),
            ("heroes.table", &self.heroes.table),
            ("tickets.table", &self.tickets.table),
            ("words.table", &self.words.table),
        ] {
            if !identifier.is_match(table) {
                return Err(AppError::validation(format!(
                    "{key} '{table}' is not a valid table name"
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Pages fetched ahead of processing
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Relational store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "defaults::database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: defaults::database_path(),
        }
    }
}

/// Match history scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesConfig {
    /// Players root URL; the account id and `/matches` are appended
    #[serde(default = "defaults::players_url")]
    pub base_url: String,

    #[serde(default = "defaults::account_id")]
    pub account_id: u64,

    /// Lowest page number to fetch (1-based)
    #[serde(default = "defaults::first_page")]
    pub first_page: u32,

    /// Highest page number to fetch; pages are processed from here down
    #[serde(default = "defaults::last_page")]
    pub last_page: u32,

    /// Only matches with a greater id are kept; read from the store when unset
    #[serde(default)]
    pub watermark: Option<u64>,

    #[serde(default = "defaults::matches_table")]
    pub table: String,

    /// Zero-based cell index holding the match duration
    #[serde(default = "defaults::duration_column")]
    pub duration_column: usize,

    #[serde(default)]
    pub selectors: MatchSelectors,

    #[serde(default = "defaults::abort")]
    pub on_malformed: ParsePolicy,
}

impl MatchesConfig {
    /// URL of the match list for the configured account.
    pub fn matches_url(&self) -> String {
        format!(
            "{}/{}/matches",
            self.base_url.trim_end_matches('/'),
            self.account_id
        )
    }
}

impl Default for MatchesConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::players_url(),
            account_id: defaults::account_id(),
            first_page: defaults::first_page(),
            last_page: defaults::last_page(),
            watermark: None,
            table: defaults::matches_table(),
            duration_column: defaults::duration_column(),
            selectors: MatchSelectors::default(),
            on_malformed: defaults::abort(),
        }
    }
}

/// CSS selectors for the match history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSelectors {
    /// The history table
    #[serde(default = "defaults::table_selector")]
    pub table: String,

    /// Rows of the table; the first one is the header
    #[serde(default = "defaults::row_selector")]
    pub row: String,

    /// Link whose href ends with the match id
    #[serde(default = "defaults::match_link_selector")]
    pub match_link: String,

    /// Hero portrait carrying the hero name in `title`
    #[serde(default = "defaults::hero_selector")]
    pub hero: String,

    /// `k/d/a` text
    #[serde(default = "defaults::kda_selector")]
    pub kda: String,

    /// Element carrying the `datetime` attribute
    #[serde(default = "defaults::time_selector")]
    pub time: String,

    /// Text whose presence in the row marks a ranked lobby
    #[serde(default = "defaults::ranked_marker")]
    pub ranked_marker: String,

    /// Outcome markers, first match wins
    #[serde(default = "defaults::outcome_rules")]
    pub outcome_rules: Vec<OutcomeRule>,
}

impl Default for MatchSelectors {
    fn default() -> Self {
        Self {
            table: defaults::table_selector(),
            row: defaults::row_selector(),
            match_link: defaults::match_link_selector(),
            hero: defaults::hero_selector(),
            kda: defaults::kda_selector(),
            time: defaults::time_selector(),
            ranked_marker: defaults::ranked_marker(),
            outcome_rules: defaults::outcome_rules(),
        }
    }
}

/// Hero listing scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroesConfig {
    #[serde(default = "defaults::heroes_url")]
    pub url: String,

    #[serde(default = "defaults::heroes_table")]
    pub table: String,

    /// Hero links inside the grid
    #[serde(default = "defaults::hero_entry_selector")]
    pub entry_selector: String,

    /// Name element inside each hero link
    #[serde(default = "defaults::hero_name_selector")]
    pub name_selector: String,

    /// Href prefix stripped to obtain the slug
    #[serde(default = "defaults::hero_link_prefix")]
    pub link_prefix: String,
}

impl Default for HeroesConfig {
    fn default() -> Self {
        Self {
            url: defaults::heroes_url(),
            table: defaults::heroes_table(),
            entry_selector: defaults::hero_entry_selector(),
            name_selector: defaults::hero_name_selector(),
            link_prefix: defaults::hero_link_prefix(),
        }
    }
}

/// Ticket dump import settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsConfig {
    /// Directory walked recursively for CSV exports
    #[serde(default = "defaults::ticket_dump_dir")]
    pub dump_dir: String,

    #[serde(default = "defaults::tickets_table")]
    pub table: String,

    /// Sprint name prefix followed by the sprint number
    #[serde(default = "defaults::sprint_prefix")]
    pub sprint_prefix: String,

    #[serde(default = "defaults::collect")]
    pub on_malformed: ParsePolicy,
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            dump_dir: defaults::ticket_dump_dir(),
            table: defaults::tickets_table(),
            sprint_prefix: defaults::sprint_prefix(),
            on_malformed: defaults::collect(),
        }
    }
}

/// Word list filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordsConfig {
    /// Space-delimited word list (`word lemma tag:tag:...`)
    #[serde(default = "defaults::words_input")]
    pub input: String,

    /// Filtered words, one per line
    #[serde(default = "defaults::words_output")]
    pub output: String,

    #[serde(default = "defaults::words_table")]
    pub table: String,

    /// Every one of these tags must be present
    #[serde(default = "defaults::include_tags")]
    pub include_tags: Vec<String>,

    /// None of these tags may be present
    #[serde(default = "defaults::exclude_tags")]
    pub exclude_tags: Vec<String>,

    /// Maximum number of distinct words kept
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default = "defaults::collect")]
    pub on_malformed: ParsePolicy,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            input: defaults::words_input(),
            output: defaults::words_output(),
            table: defaults::words_table(),
            include_tags: defaults::include_tags(),
            exclude_tags: defaults::exclude_tags(),
            limit: None,
            on_malformed: defaults::collect(),
        }
    }
}

/// Run report settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON file receiving the run summary
    #[serde(default)]
    pub stats_file: Option<String>,
}

mod defaults {
    use super::{OutcomeRule, Outcome, ParsePolicy};

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; ingest/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        1
    }

    pub fn database_path() -> String {
        "data/ingest.db".into()
    }

    pub fn abort() -> ParsePolicy {
        ParsePolicy::Abort
    }
    pub fn collect() -> ParsePolicy {
        ParsePolicy::Collect
    }

    // Match history defaults
    pub fn players_url() -> String {
        "https://www.dotabuff.com/players".into()
    }
    pub fn account_id() -> u64 {
        253137085
    }
    pub fn first_page() -> u32 {
        1
    }
    pub fn last_page() -> u32 {
        3
    }
    pub fn matches_table() -> String {
        "dota_game_records".into()
    }
    pub fn duration_column() -> usize {
        5
    }
    pub fn table_selector() -> String {
        "div.content-inner > section > section > article > table".into()
    }
    pub fn row_selector() -> String {
        "tr".into()
    }
    pub fn match_link_selector() -> String {
        "td.cell-large > a[href]".into()
    }
    pub fn hero_selector() -> String {
        "img.image-hero".into()
    }
    pub fn kda_selector() -> String {
        "td > span.kda-record".into()
    }
    pub fn time_selector() -> String {
        "time[datetime]".into()
    }
    pub fn ranked_marker() -> String {
        "Ranked".into()
    }
    pub fn outcome_rules() -> Vec<OutcomeRule> {
        vec![
            OutcomeRule::new("a.lost", Outcome::Lost),
            OutcomeRule::new("a.won", Outcome::Won),
            OutcomeRule::new("a.abandoned", Outcome::Abandoned),
        ]
    }

    // Hero listing defaults
    pub fn heroes_url() -> String {
        "https://www.dotabuff.com/heroes".into()
    }
    pub fn heroes_table() -> String {
        "dota_heroes".into()
    }
    pub fn hero_entry_selector() -> String {
        "div.hero-grid > a[href]".into()
    }
    pub fn hero_name_selector() -> String {
        "div.name".into()
    }
    pub fn hero_link_prefix() -> String {
        "/heroes/".into()
    }

    // Ticket defaults
    pub fn ticket_dump_dir() -> String {
        "dumps/jira".into()
    }
    pub fn tickets_table() -> String {
        "jira_tickets".into()
    }
    pub fn sprint_prefix() -> String {
        "TTKG2 Sprint ".into()
    }

    // Word list defaults
    pub fn words_input() -> String {
        "dumps/words/words-all.txt".into()
    }
    pub fn words_output() -> String {
        "dumps/words/words-all-out.txt".into()
    }
    pub fn words_table() -> String {
        "ua_words".into()
    }
    pub fn include_tags() -> Vec<String> {
        vec!["noun".into(), "v_naz".into()]
    }
    pub fn exclude_tags() -> Vec<String> {
        [
            "bad", "vulg", "fname", "lname", "pname", "geo", "prop", "p", "slang", "ns", "abbr",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
}
