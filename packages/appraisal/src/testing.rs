//! Testing utilities including mock collaborators.
//!
//! These are useful for testing applications that use the appraisal
//! library without making real AI or network calls. Each mock returns
//! deterministic, configurable responses and records the calls made to
//! it for assertions.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{
    AnalyzerResult, AppraisalError, EvaluatorError, EvaluatorResult, Result, ScrapeError,
    ScrapeResult,
};
use crate::traits::{ImageAnalyzer, MarketScraper, MatchEvaluator, QueryGenerator};
use crate::types::analysis::{AnalysisOutcome, ItemDescription};
use crate::types::listing::Listing;

/// A mock image analyzer with a configurable outcome.
#[derive(Clone)]
pub struct MockAnalyzer {
    outcome: AnalysisOutcome,
    calls: Arc<RwLock<Vec<Vec<String>>>>,
}

impl MockAnalyzer {
    /// Succeed with a minimal description of `item_name`.
    pub fn succeeding(item_name: &str) -> Self {
        Self::with_description(ItemDescription::new(item_name))
    }

    /// Succeed with a full description.
    pub fn with_description(description: ItemDescription) -> Self {
        Self {
            outcome: AnalysisOutcome::Success(description),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Reject every image set with `reason`.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            outcome: AnalysisOutcome::Error {
                reason: reason.to_string(),
            },
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// The image sets this mock was called with.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ImageAnalyzer for MockAnalyzer {
    async fn analyze(&self, images: &[String]) -> AnalyzerResult<AnalysisOutcome> {
        self.calls.write().unwrap().push(images.to_vec());
        Ok(self.outcome.clone())
    }
}

/// A mock query generator returning scripted queries in call order.
///
/// Once the script runs out it falls back to a query derived from the
/// item description, so a loop can always keep going.
#[derive(Default, Clone)]
pub struct MockQueryGenerator {
    script: Arc<RwLock<Vec<String>>>,
    fail: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockQueryGenerator {
    /// Derive every query from the description (no script).
    pub fn echoing() -> Self {
        Self::default()
    }

    /// Return the given queries in order, then fall back to echoing.
    pub fn scripted(queries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            script: Arc::new(RwLock::new(queries.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    /// Fail every call.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// The feedback strings this mock was called with, in order.
    pub fn feedback_seen(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl QueryGenerator for MockQueryGenerator {
    async fn generate(&self, description: &ItemDescription, feedback: &str) -> Result<String> {
        let call_index = {
            let mut calls = self.calls.write().unwrap();
            calls.push(feedback.to_string());
            calls.len() - 1
        };
        if self.fail {
            return Err(AppraisalError::QueryGeneration {
                reason: "mock generator offline".to_string(),
            });
        }
        Ok(self
            .script
            .read()
            .unwrap()
            .get(call_index)
            .cloned()
            .unwrap_or_else(|| description.fallback_query()))
    }
}

/// A mock scraper that writes a predefined corpus file.
///
/// Honors the real scraper's contract: the corpus lands at the
/// configured path as a side effect and the return value is a status
/// line. An `inert` scraper writes nothing, which makes the loop skip
/// the round.
#[derive(Clone)]
pub struct MockScraper {
    corpus_path: PathBuf,
    listings: Arc<RwLock<Vec<Listing>>>,
    fail: bool,
    inert: bool,
    calls: Arc<RwLock<Vec<(String, usize)>>>,
}

impl MockScraper {
    /// A scraper that writes an empty corpus to `corpus_path`.
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            listings: Arc::new(RwLock::new(Vec::new())),
            fail: false,
            inert: false,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the listings every scrape writes.
    pub fn with_listings(self, listings: impl IntoIterator<Item = Listing>) -> Self {
        *self.listings.write().unwrap() = listings.into_iter().collect();
        self
    }

    /// Fail every scrape without writing a corpus.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Succeed without ever writing a corpus.
    pub fn inert(mut self) -> Self {
        self.inert = true;
        self
    }

    /// The `(query, min_items)` pairs this mock was called with.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl MarketScraper for MockScraper {
    async fn scrape(&self, query: &str, min_items: usize) -> ScrapeResult<String> {
        self.calls
            .write()
            .unwrap()
            .push((query.to_string(), min_items));

        if self.fail {
            return Err(ScrapeError::BadStatus {
                status: "mock marketplace unreachable".to_string(),
            });
        }
        if self.inert {
            return Ok("scraped 0 items".to_string());
        }

        let listings = self.listings.read().unwrap().clone();
        if let Some(parent) = self.corpus_path.parent() {
            fs::create_dir_all(parent).map_err(ScrapeError::CorpusWrite)?;
        }
        let json =
            serde_json::to_string_pretty(&listings).expect("listings serialize to JSON");
        fs::write(&self.corpus_path, json).map_err(ScrapeError::CorpusWrite)?;

        Ok(format!("scraped {} items", listings.len()))
    }
}

/// A mock evaluator returning scripted payloads in call order.
///
/// Runs past the end of the script return an empty object, which the
/// loop decodes into an empty report.
#[derive(Default, Clone)]
pub struct MockEvaluator {
    script: Arc<RwLock<Vec<Value>>>,
    fail: bool,
    calls: Arc<RwLock<Vec<EvaluatorCall>>>,
}

/// Record of one call made to [`MockEvaluator`].
#[derive(Debug, Clone)]
pub struct EvaluatorCall {
    pub query: String,
    pub feedback: String,
    pub corpus_path: PathBuf,
}

impl MockEvaluator {
    /// Return the given payloads in order.
    pub fn scripted(payloads: impl IntoIterator<Item = Value>) -> Self {
        Self {
            script: Arc::new(RwLock::new(payloads.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Fail every call.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<EvaluatorCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl MatchEvaluator for MockEvaluator {
    async fn evaluate(
        &self,
        _description: &ItemDescription,
        query: &str,
        feedback: &str,
        corpus_path: &Path,
    ) -> EvaluatorResult<Value> {
        let call_index = {
            let mut calls = self.calls.write().unwrap();
            calls.push(EvaluatorCall {
                query: query.to_string(),
                feedback: feedback.to_string(),
                corpus_path: corpus_path.to_path_buf(),
            });
            calls.len() - 1
        };
        if self.fail {
            return Err(EvaluatorError::Service("mock evaluator offline".into()));
        }
        Ok(self
            .script
            .read()
            .unwrap()
            .get(call_index)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

/// Build an evaluator payload in the wire shape.
///
/// `verdicts` are `(id, is_match, price)` triples.
pub fn evaluation_payload(
    verdicts: &[(&str, bool, &str)],
    match_percentage: f64,
    sufficiency: &str,
    feedback: &str,
) -> Value {
    let results: Vec<Value> = verdicts
        .iter()
        .map(|(id, is_match, price)| json!({"id": id, "is_match": is_match, "price": price}))
        .collect();
    json!({
        "individual_results_evaluation": results,
        "match_percentage": match_percentage,
        "overall_sufficiency": sufficiency,
        "query_improvement_feedback": feedback,
    })
}

/// Builder wiring a full mock collaborator set around one corpus path.
pub struct TestScenario {
    analyzer: MockAnalyzer,
    queries: MockQueryGenerator,
    scraper: MockScraper,
    evaluator: MockEvaluator,
}

impl TestScenario {
    /// A scenario whose scraper writes its corpus to `corpus_path`.
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        let corpus_path = corpus_path.into();
        Self {
            analyzer: MockAnalyzer::succeeding("test item"),
            queries: MockQueryGenerator::echoing(),
            scraper: MockScraper::new(corpus_path).with_listings([Listing::new(
                "1",
                "test item",
                "50 €",
            )]),
            evaluator: MockEvaluator::default(),
        }
    }

    /// Replace the analyzer.
    pub fn with_analyzer(mut self, analyzer: MockAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Replace the query generator.
    pub fn with_queries(mut self, queries: MockQueryGenerator) -> Self {
        self.queries = queries;
        self
    }

    /// Replace the scraper.
    pub fn with_scraper(mut self, scraper: MockScraper) -> Self {
        self.scraper = scraper;
        self
    }

    /// Script the evaluator's per-round payloads.
    pub fn with_evaluations(mut self, payloads: impl IntoIterator<Item = Value>) -> Self {
        self.evaluator = MockEvaluator::scripted(payloads);
        self
    }

    /// Get all four mocks.
    pub fn build(self) -> (MockAnalyzer, MockQueryGenerator, MockScraper, MockEvaluator) {
        (self.analyzer, self.queries, self.scraper, self.evaluator)
    }
}
