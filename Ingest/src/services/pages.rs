// src/services/pages.rs

//! Page sources.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::Result;
use crate::models::{HeroesConfig, MatchesConfig};
use crate::utils::http;

/// A source of HTML pages addressed by page number (1-based).
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Source name used in errors and logs.
    fn name(&self) -> String;

    /// Fetch the raw body of one page.
    async fn fetch_page(&self, page: u32) -> Result<String>;
}

/// Fetches pages over HTTP.
pub struct HttpPageSource {
    client: Client,
    url: Url,
    paginated: bool,
}

impl HttpPageSource {
    /// Paged listing: every request carries `enhance=overview&page=N`.
    pub fn paginated(client: Client, url: &str) -> Result<Self> {
        Ok(Self {
            client,
            url: Url::parse(url)?,
            paginated: true,
        })
    }

    /// A single document; the page number is ignored.
    pub fn single(client: Client, url: &str) -> Result<Self> {
        Ok(Self {
            client,
            url: Url::parse(url)?,
            paginated: false,
        })
    }

    /// Match history of the configured account.
    pub fn match_history(client: Client, config: &MatchesConfig) -> Result<Self> {
        Self::paginated(client, &config.matches_url())
    }

    /// Hero index page.
    pub fn hero_index(client: Client, config: &HeroesConfig) -> Result<Self> {
        Self::single(client, &config.url)
    }

    /// Request URL for a page.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.url.clone();
        if self.paginated {
            url.query_pairs_mut()
                .append_pair("enhance", "overview")
                .append_pair("page", &page.to_string());
        }
        url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    fn name(&self) -> String {
        self.url.to_string()
    }

    async fn fetch_page(&self, page: u32) -> Result<String> {
        let url = self.page_url(page);
        log::debug!("Fetching page {} from {}", page, url);
        http::fetch_text(&self.client, url.as_str()).await
    }
}
