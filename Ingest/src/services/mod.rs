//! Source readers for the ingestion pipelines.
//!
//! Web sources are exposed as numbered pages through `PageSource`, so the
//! pipeline drivers can be run against canned HTML in tests.

mod pages;

pub use pages::{HttpPageSource, PageSource};
