// src/models/mod.rs

//! Domain models for the ingestion pipelines.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod hero;
mod match_record;
mod stats;
mod ticket;
mod word;

// Re-export all public types
pub use config::{
    Config, DatabaseConfig, HeroesConfig, HttpConfig, MatchSelectors, MatchesConfig, OutputConfig,
    TicketsConfig, WordsConfig,
};
pub use hero::Hero;
pub use match_record::{MatchRecord, Outcome};
pub use stats::RunStats;
pub use ticket::Ticket;
pub use word::TaggedWord;
