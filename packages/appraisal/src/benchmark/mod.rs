//! Benchmark harness measuring prediction accuracy against ground truth.
//!
//! Samples labeled items from a corpus, runs the refinement loop on each
//! item's photographs, and scores the predicted price against the known
//! one. Items without usable data — and runs that end fatally — are
//! excluded from the aggregates but surfaced in a `skipped` tally so the
//! exclusion cannot silently inflate accuracy.

use chrono::Local;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pricing::parse_price;
use crate::traits::{ImageAnalyzer, MarketScraper, MatchEvaluator, QueryGenerator};
use crate::types::config::BenchmarkConfig;
use crate::workflow::RefinementLoop;

/// A labeled ground-truth item from the benchmark corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthItem {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub category: String,

    /// Raw listing price; must parse for the item to be evaluated
    pub price: String,

    /// Local paths of the item's photographs
    #[serde(default)]
    pub local_images: Vec<String>,
}

/// Outcome of one evaluated benchmark item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub id: String,
    pub category: String,
    pub actual: f64,
    pub predicted: f64,
    pub error_pct: f64,
    /// True when `error_pct` is under the configured threshold
    pub success: bool,
}

/// Per-category aggregate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub items: usize,
    /// Mean of the per-item success flags, 0..=1
    pub success_rate: f64,
    pub avg_error_pct: f64,
}

/// Aggregate benchmark report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub records: Vec<BenchmarkRecord>,

    /// Sorted by descending success rate
    pub categories: Vec<CategorySummary>,

    /// Global mean success over all evaluated items, 0..=1
    pub accuracy: f64,

    pub avg_error_pct: f64,

    /// Sampled items dropped before aggregation: missing price or
    /// images, or a fatal loop run
    pub skipped: usize,
}

impl BenchmarkReport {
    fn from_records(records: Vec<BenchmarkRecord>, skipped: usize) -> Self {
        let mut by_category: IndexMap<String, Vec<&BenchmarkRecord>> = IndexMap::new();
        for record in &records {
            by_category
                .entry(record.category.clone())
                .or_default()
                .push(record);
        }

        let mut categories: Vec<CategorySummary> = by_category
            .into_iter()
            .map(|(category, rows)| {
                let items = rows.len();
                let successes = rows.iter().filter(|row| row.success).count();
                let error_sum: f64 = rows.iter().map(|row| row.error_pct).sum();
                CategorySummary {
                    category,
                    items,
                    success_rate: successes as f64 / items as f64,
                    avg_error_pct: error_sum / items as f64,
                }
            })
            .collect();
        categories.sort_by(|a, b| b.success_rate.total_cmp(&a.success_rate));

        let (accuracy, avg_error_pct) = if records.is_empty() {
            (0.0, 0.0)
        } else {
            let successes = records.iter().filter(|record| record.success).count();
            let error_sum: f64 = records.iter().map(|record| record.error_pct).sum();
            (
                successes as f64 / records.len() as f64,
                error_sum / records.len() as f64,
            )
        };

        Self {
            records,
            categories,
            accuracy,
            avg_error_pct,
            skipped,
        }
    }

    /// Render the printable aggregate table.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(56);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "BENCHMARK REPORT");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "Total Accuracy: {:.1}% | Avg Error: {:.1}%",
            self.accuracy * 100.0,
            self.avg_error_pct
        );
        if self.skipped > 0 {
            let _ = writeln!(out, "Skipped: {} item(s) excluded from aggregates", self.skipped);
        }
        let _ = writeln!(out, "{}", "-".repeat(56));
        let _ = writeln!(
            out,
            "{:<24} {:>6} {:>12} {:>10}",
            "category", "items", "success_rate", "avg_error"
        );
        for summary in &self.categories {
            let _ = writeln!(
                out,
                "{:<24} {:>6} {:>11.1}% {:>9.1}%",
                summary.category,
                summary.items,
                summary.success_rate * 100.0,
                summary.avg_error_pct
            );
        }
        let _ = writeln!(out, "{rule}");
        out
    }
}

/// Load a ground-truth corpus from a JSON file (an array of items).
pub fn load_corpus(path: &Path) -> Result<Vec<GroundTruthItem>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Runs the refinement loop over sampled ground-truth items and scores
/// the predictions.
pub struct BenchmarkHarness<A, Q, S, E> {
    workflow: RefinementLoop<A, Q, S, E>,
    config: BenchmarkConfig,
}

impl<A, Q, S, E> BenchmarkHarness<A, Q, S, E>
where
    A: ImageAnalyzer,
    Q: QueryGenerator,
    S: MarketScraper,
    E: MatchEvaluator,
{
    /// Create a harness with the default configuration.
    pub fn new(workflow: RefinementLoop<A, Q, S, E>) -> Self {
        Self::with_config(workflow, BenchmarkConfig::default())
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(workflow: RefinementLoop<A, Q, S, E>, config: BenchmarkConfig) -> Self {
        Self { workflow, config }
    }

    /// Benchmark the loop against `corpus`, optionally filtered to one
    /// category. Items are processed strictly one after another.
    pub async fn run(&self, corpus: &[GroundTruthItem], category: Option<&str>) -> BenchmarkReport {
        let filtered: Vec<&GroundTruthItem> = corpus
            .iter()
            .filter(|item| category.is_none_or(|wanted| item.category == wanted))
            .collect();
        let sample = self.sample(&filtered);
        info!(
            corpus = filtered.len(),
            sampled = sample.len(),
            "benchmark sample selected"
        );

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for item in sample {
            let Some(actual) = parse_price(&item.price) else {
                debug!(id = %item.id, "skipping item without a parseable price");
                skipped += 1;
                continue;
            };
            if item.local_images.is_empty() {
                debug!(id = %item.id, "skipping item without images");
                skipped += 1;
                continue;
            }

            info!(id = %item.id, title = %item.title, actual, "benchmarking item");
            let result = self.workflow.run(&item.local_images).await;
            if let Some(error) = &result.error {
                warn!(id = %item.id, error = %error, "loop run ended fatally, excluding item");
                skipped += 1;
                continue;
            }

            let predicted = result.predicted_price();
            let error_pct = (predicted - actual).abs() / actual * 100.0;
            let success = error_pct < self.config.success_threshold_pct;
            info!(id = %item.id, predicted, error_pct, success, "item scored");

            records.push(BenchmarkRecord {
                id: item.id.clone(),
                category: item.category.clone(),
                actual,
                predicted,
                error_pct,
                success,
            });
        }

        let report = BenchmarkReport::from_records(records, skipped);
        self.persist(&report);
        report
    }

    /// Uniform sample without replacement of at most `sample_size` items.
    fn sample<'a>(&self, items: &[&'a GroundTruthItem]) -> Vec<&'a GroundTruthItem> {
        let mut rng = match self.config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut indices: Vec<usize> = (0..items.len()).collect();
        rng.shuffle(&mut indices);
        indices.truncate(self.config.sample_size.min(items.len()));
        indices.into_iter().map(|index| items[index]).collect()
    }

    fn persist(&self, report: &BenchmarkReport) {
        let Some(dir) = &self.config.results_dir else {
            return;
        };
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "could not create results directory");
            return;
        }
        let path = dir.join(format!("benchmark_{}.json", Local::now().format("%Y%m%d_%H%M%S")));
        match serde_json::to_string_pretty(report) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    warn!(file = %path.display(), error = %e, "could not write benchmark report");
                }
            }
            Err(e) => warn!(error = %e, "could not serialize benchmark report"),
        }
    }
}
