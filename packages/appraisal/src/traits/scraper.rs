//! Marketplace scraper collaborator contract.

use async_trait::async_trait;

use crate::error::ScrapeResult;

/// Marketplace search collaborator.
///
/// A scrape writes the listing corpus to the path configured on the loop
/// as a side effect and returns a collaborator-defined status line. The
/// loop treats any error as recoverable and checks the corpus path itself
/// before evaluating, so a failed scrape degrades the round rather than
/// aborting the run.
#[async_trait]
pub trait MarketScraper: Send + Sync {
    /// Search the marketplace and persist at least `min_items` listings
    /// when available.
    async fn scrape(&self, query: &str, min_items: usize) -> ScrapeResult<String>;
}
