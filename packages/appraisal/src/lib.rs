//! Iterative resale price appraisal library.
//!
//! Estimates a fair resale price for a product shown in a set of
//! photographs by repeatedly searching a classifieds marketplace,
//! judging which results actually depict the same product, and
//! aggregating their prices into a statistic. Because any single search
//! query is unreliable, the loop runs multiple refinement rounds, using
//! the evaluator's feedback to improve the next query and stopping early
//! once enough confident matches exist.
//!
//! # Design Philosophy
//!
//! - Collaborators (vision, query generation, scraping, evaluation) are
//!   trait contracts; the loop owns control flow and aggregation.
//! - Loose service payloads are decoded once at the loop boundary into
//!   typed reports; downstream code never re-inspects raw JSON.
//! - Failures degrade rounds instead of aborting runs. Only a rejected
//!   image set is fatal — there is no point searching for an item that
//!   could not be identified.
//! - Matches deduplicate across rounds by listing id (last write wins),
//!   so price confidence grows monotonically under the default
//!   cumulative policy.
//!
//! # Usage
//!
//! ```rust,ignore
//! use appraisal::{BenchmarkHarness, RefinementLoop, WorkflowConfig};
//! use appraisal::testing::{evaluation_payload, TestScenario};
//!
//! let (analyzer, queries, scraper, evaluator) = TestScenario::new(&corpus_path)
//!     .with_evaluations([evaluation_payload(
//!         &[("1", true, "70 €")],
//!         80.0,
//!         "sufficient",
//!         "",
//!     )])
//!     .build();
//!
//! let config = WorkflowConfig::default().with_corpus_path(&corpus_path);
//! let workflow = RefinementLoop::with_config(analyzer, queries, scraper, evaluator, config);
//! let result = workflow.run(&images).await;
//! println!("estimated price: {}", result.predicted_price());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator contracts (ImageAnalyzer, QueryGenerator,
//!   MarketScraper, MatchEvaluator)
//! - [`types`] - Domain data types and configuration
//! - [`pricing`] - Price parsing, statistics, match accumulation
//! - [`workflow`] - The refinement loop engine and run artifacts
//! - [`benchmark`] - Accuracy benchmark harness
//! - [`testing`] - Mock collaborators for tests

pub mod benchmark;
pub mod error;
pub mod pricing;
pub mod testing;
pub mod traits;
pub mod types;
pub mod workflow;

// Re-export core types at crate root
pub use error::{AnalyzerError, AppraisalError, EvaluatorError, ScrapeError};
pub use traits::{ImageAnalyzer, MarketScraper, MatchEvaluator, QueryGenerator};
pub use types::{
    analysis::{AnalysisOutcome, ItemDescription},
    config::{BenchmarkConfig, StatisticsPolicy, WorkflowConfig},
    evaluation::{EvaluationCounts, EvaluationReport},
    listing::{Listing, ListingVerdict},
    workflow::{IterationRecord, WorkflowResult},
};

pub use pricing::{parse_price, MatchAccumulator, PriceStatistics};

// Re-export the engines
pub use benchmark::{
    load_corpus, BenchmarkHarness, BenchmarkRecord, BenchmarkReport, CategorySummary,
    GroundTruthItem,
};
pub use workflow::{RefinementLoop, RunRecorder};
