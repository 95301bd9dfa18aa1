//! The refinement loop - core engine of the library.
//!
//! Drives image analysis → query generation → scrape → evaluation across
//! a bounded number of rounds, accumulating matches and price statistics
//! and stopping early once the evaluator judges the match set sufficient.
//!
//! Failure tiers:
//! - **Fatal**: image analysis rejecting the input (or being
//!   unreachable). No search round is attempted.
//! - **Recoverable**: scrape errors, a missing corpus, an undecodable
//!   evaluator payload, query-generation errors. Each degrades the
//!   current round and the loop continues.
//!
//! `run` never returns an error past its boundary; every outcome is a
//! [`WorkflowResult`].

pub mod artifacts;

use tracing::{debug, info, warn};

use crate::pricing::{MatchAccumulator, PriceStatistics};
use crate::traits::{ImageAnalyzer, MarketScraper, MatchEvaluator, QueryGenerator};
use crate::types::{
    config::{StatisticsPolicy, WorkflowConfig},
    evaluation::EvaluationReport,
    workflow::{IterationRecord, WorkflowResult},
};

pub use artifacts::RunRecorder;

/// Most photographs the analyzer contract accepts per item.
const MAX_ANALYSIS_IMAGES: usize = 4;

/// The query refinement engine.
///
/// Generic over the four collaborator contracts so tests and
/// applications can wire any implementation.
///
/// # Example
///
/// ```rust,ignore
/// let workflow = RefinementLoop::with_config(analyzer, queries, scraper, evaluator, config);
/// let result = workflow.run(&images).await;
/// if result.success {
///     println!("estimated price: {}", result.predicted_price());
/// }
/// ```
pub struct RefinementLoop<A, Q, S, E> {
    analyzer: A,
    queries: Q,
    scraper: S,
    evaluator: E,
    config: WorkflowConfig,
}

impl<A, Q, S, E> RefinementLoop<A, Q, S, E>
where
    A: ImageAnalyzer,
    Q: QueryGenerator,
    S: MarketScraper,
    E: MatchEvaluator,
{
    /// Create a loop with the default configuration.
    pub fn new(analyzer: A, queries: Q, scraper: S, evaluator: E) -> Self {
        Self::with_config(analyzer, queries, scraper, evaluator, WorkflowConfig::default())
    }

    /// Create a loop with a custom configuration.
    pub fn with_config(
        analyzer: A,
        queries: Q,
        scraper: S,
        evaluator: E,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            analyzer,
            queries,
            scraper,
            evaluator,
            config,
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Run one full appraisal over a set of product photographs.
    ///
    /// Always returns a [`WorkflowResult`]; see the module docs for the
    /// failure tiers.
    pub async fn run(&self, images: &[String]) -> WorkflowResult {
        let recorder = RunRecorder::begin(self.config.artifacts_root.as_deref());
        let images = &images[..images.len().min(MAX_ANALYSIS_IMAGES)];

        // Phase 1: image analysis, the only fatal path. Without a
        // trustworthy description every search round would be wasted.
        let outcome = match self.analyzer.analyze(images).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "image analysis unavailable, aborting run");
                return WorkflowResult::fatal(e.to_string());
            }
        };
        recorder.record_analysis(&outcome);
        let description = match outcome.into_description() {
            Ok(description) => description,
            Err(reason) => {
                warn!(reason = %reason, "image analysis rejected input, aborting run");
                return WorkflowResult::fatal(reason);
            }
        };
        info!(item = %description.item_name, "image analysis complete");

        let mut query = match self.queries.generate(&description, "").await {
            Ok(query) => query,
            Err(e) => {
                warn!(error = %e, "initial query generation failed, deriving from description");
                description.fallback_query()
            }
        };

        let mut accumulator = MatchAccumulator::new();
        let mut history: Vec<IterationRecord> = Vec::new();
        let mut best: Option<IterationRecord> = None;
        let mut feedback = String::new();

        for round in 1..=self.config.max_rounds {
            if round > 1 {
                match self.queries.generate(&description, &feedback).await {
                    Ok(regenerated) => query = regenerated,
                    Err(e) => {
                        warn!(round, error = %e, "query regeneration failed, reusing previous query");
                    }
                }
            }
            info!(round, query = %query, "starting refinement round");

            if let Err(e) = self.scraper.scrape(&query, self.config.min_listings).await {
                warn!(round, error = %e, "scrape failed, continuing with existing corpus");
            }

            // A missing corpus is "insufficient evidence", not an error:
            // the round is skipped but its budget is spent.
            if !self.config.corpus_path.exists() {
                warn!(
                    round,
                    corpus = %self.config.corpus_path.display(),
                    "no corpus available, skipping round"
                );
                continue;
            }

            let (payload, report) = match self
                .evaluator
                .evaluate(&description, &query, &feedback, &self.config.corpus_path)
                .await
            {
                Ok(payload) => {
                    let report = EvaluationReport::from_payload(&payload).unwrap_or_else(|| {
                        warn!(round, "evaluator payload did not decode, substituting empty report");
                        EvaluationReport::default()
                    });
                    (payload, report)
                }
                Err(e) => {
                    warn!(round, error = %e, "evaluation failed, substituting empty report");
                    (serde_json::Value::Null, EvaluationReport::default())
                }
            };

            accumulator.absorb(&report.individual_results_evaluation);
            let prices = match self.config.statistics_policy {
                StatisticsPolicy::Cumulative => accumulator.parsed_prices(),
                StatisticsPolicy::PerRound => report
                    .positive_verdicts()
                    .filter_map(|verdict| verdict.parsed_price())
                    .collect(),
            };
            let stats = PriceStatistics::compute(&prices);

            let counts = report.resolved_counts();
            let match_percentage = report.match_percentage();
            info!(
                round,
                match_percentage,
                positive = counts.positive,
                negative = counts.negative,
                cumulative_matches = accumulator.len(),
                priced = stats.count,
                "round evaluated"
            );

            let sufficient = report.is_sufficient();
            feedback = report.query_improvement_feedback.clone().unwrap_or_default();

            let record = IterationRecord {
                round,
                query: query.clone(),
                evaluation: payload,
                count_positive: counts.positive,
                count_negative: counts.negative,
                total_listings: counts.total,
                match_percentage,
                price_statistics: stats,
            };
            recorder.record_round(&record);

            // Strictly greater: a tie keeps the earlier round.
            if best
                .as_ref()
                .is_none_or(|current| record.match_percentage > current.match_percentage)
            {
                best = Some(record.clone());
            }
            history.push(record);

            if sufficient {
                info!(round, "match set judged sufficient, stopping early");
                let result = WorkflowResult::finished(true, best, history, description);
                recorder.record_final(&result);
                return result;
            }
            debug!(round, feedback = %feedback, "verdict not sufficient, carrying feedback forward");
        }

        info!(rounds = self.config.max_rounds, "round budget exhausted");
        let result = WorkflowResult::finished(false, best, history, description);
        recorder.record_final(&result);
        result
    }
}
