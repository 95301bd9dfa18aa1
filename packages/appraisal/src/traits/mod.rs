//! Core trait abstractions for the collaborators the loop consumes.
//!
//! Each trait mirrors one external service contract: the vision-based
//! image analyzer, the natural-language query generator, the marketplace
//! scraper, and the match evaluator. The loop only depends on these
//! contracts, never on a concrete service.

pub mod analyzer;
pub mod evaluator;
pub mod query;
pub mod scraper;

pub use analyzer::ImageAnalyzer;
pub use evaluator::MatchEvaluator;
pub use query::QueryGenerator;
pub use scraper::MarketScraper;
