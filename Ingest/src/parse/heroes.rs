// src/parse/heroes.rs

//! Hero index parser.

use scraper::{Html, Selector};

use crate::error::Result;
use crate::models::{HeroesConfig, Hero};
use crate::parse::parse_selector;

/// Extracts hero names and page slugs from the hero grid.
#[derive(Debug)]
pub struct HeroListParser {
    entry: Selector,
    name: Selector,
    link_prefix: String,
}

impl HeroListParser {
    pub fn new(config: &HeroesConfig) -> Result<Self> {
        Ok(Self {
            entry: parse_selector(&config.entry_selector)?,
            name: parse_selector(&config.name_selector)?,
            link_prefix: config.link_prefix.clone(),
        })
    }

    /// Grid entries without a name element (trailing filler links) are skipped.
    pub fn parse(&self, html: &str) -> Vec<Hero> {
        let document = Html::parse_document(html);
        document
            .select(&self.entry)
            .filter_map(|entry| {
                let name = entry
                    .select(&self.name)
                    .next()
                    .map(|el| el.text().collect::<String>())?;
                let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
                let href = entry.value().attr("href")?;
                let slug = href
                    .strip_prefix(&self.link_prefix)
                    .unwrap_or(href)
                    .trim_matches('/')
                    .to_string();

                if name.is_empty() || slug.is_empty() {
                    log::debug!("Skipping hero grid entry with href {:?}", href);
                    return None;
                }
                Some(Hero { name, slug })
            })
            .collect()
    }
}
