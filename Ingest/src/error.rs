// src/error.rs

//! Unified error handling for the ingestion pipelines.

use std::fmt;

use thiserror::Error;

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required field could not be extracted or coerced from a raw record
    #[error("Malformed record in {source_name} at {record}: field '{field}': {reason}")]
    MalformedRecord {
        source_name: String,
        record: String,
        field: String,
        reason: String,
    },

    /// A tabular input is missing a required column
    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { source_name: String, column: String },

    /// A page yielded no records at all
    #[error("Empty page {page} from {source_name}")]
    EmptyPage { source_name: String, page: u32 },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV reading failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Directory traversal failed
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a malformed-record error.
    pub fn malformed(
        source_name: impl Into<String>,
        record: impl Into<String>,
        field: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::MalformedRecord {
            source_name: source_name.into(),
            record: record.into(),
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a missing-column error.
    pub fn missing_column(source_name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            source_name: source_name.into(),
            column: column.into(),
        }
    }

    /// Create an empty-page error.
    pub fn empty_page(source_name: impl Into<String>, page: u32) -> Self {
        Self::EmptyPage {
            source_name: source_name.into(),
            page,
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error describes a single bad record rather than a run failure.
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}
