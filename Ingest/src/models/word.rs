//! Dictionary word with grammatical tags.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A word list entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggedWord {
    pub text: String,
    pub tags: BTreeSet<String>,
}

impl TaggedWord {
    pub fn new<I, S>(text: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
