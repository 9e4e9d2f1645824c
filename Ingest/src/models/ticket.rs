//! Ticket tracker export row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A ticket normalized from a tracker CSV dump.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Numeric issue id (primary key)
    pub issue_id: i64,

    /// Human-readable key (e.g. `PROJ-123`)
    pub key: String,

    /// Parent issue id for sub-tasks
    pub parent_id: Option<i64>,

    pub summary: Option<String>,
    pub assignee: Option<String>,

    /// Sprint name as exported
    pub sprint: Option<String>,

    /// Sprint number, when the sprint name follows the team prefix
    pub sprint_number: Option<u32>,

    pub story_points: Option<f64>,

    pub status: String,

    /// Date of the last update (time of day dropped)
    pub updated: Option<NaiveDate>,
}
