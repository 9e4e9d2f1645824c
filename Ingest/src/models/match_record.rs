//! Match history row.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Result of a single match as shown in the history table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Outcome {
    Won,
    Lost,
    Abandoned,
    Unknown,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Won => "Won",
            Outcome::Lost => "Lost",
            Outcome::Abandoned => "Abandoned",
            Outcome::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One played match scraped from a match-history page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRecord {
    /// Site-wide match identifier, grows with time
    pub id: u64,

    /// Hero played
    pub hero: String,

    pub outcome: Outcome,

    /// Whether the lobby was ranked
    pub ranked: bool,

    /// Match length rounded up to whole minutes
    pub duration_minutes: u32,

    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,

    /// Start time, local to the site (offset dropped)
    pub played_at: NaiveDateTime,
}

impl MatchRecord {
    /// Kill/death/assist triple formatted the way the site shows it.
    pub fn kda(&self) -> String {
        format!("{}/{}/{}", self.kills, self.deaths, self.assists)
    }
}
