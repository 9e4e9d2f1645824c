//! Hero lookup entry.

use serde::{Deserialize, Serialize};

/// A hero listed on the hero index page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hero {
    /// Display name
    pub name: String,

    /// Path segment of the hero page (e.g. `anti-mage`)
    pub slug: String,
}
