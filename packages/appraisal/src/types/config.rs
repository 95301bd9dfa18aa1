//! Configuration types for the refinement loop and the benchmark harness.
//!
//! Engines take their configuration at construction; there is no
//! process-wide state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which match set the per-round statistics are computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsPolicy {
    /// The deduplicated union of all matches seen across rounds so far.
    /// Price confidence only grows as rounds proceed and never regresses
    /// on a single noisy round.
    #[default]
    Cumulative,

    /// The current round's matches only.
    PerRound,
}

/// Configuration for the refinement loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum number of query→search→evaluate rounds.
    pub max_rounds: usize,

    /// Minimum listings requested from the scraper per round.
    pub min_listings: usize,

    /// Path the scraper writes the listing corpus to. A round with no
    /// file at this path is skipped, still consuming budget.
    pub corpus_path: PathBuf,

    /// Which match set statistics are computed over.
    pub statistics_policy: StatisticsPolicy,

    /// Root directory for run artifacts; `None` disables recording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts_root: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            min_listings: 10,
            corpus_path: PathBuf::from("market_data/listings.json"),
            statistics_policy: StatisticsPolicy::default(),
            artifacts_root: None,
        }
    }
}

impl WorkflowConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the round budget.
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set the minimum listings per scrape.
    pub fn with_min_listings(mut self, min: usize) -> Self {
        self.min_listings = min;
        self
    }

    /// Set the corpus path.
    pub fn with_corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus_path = path.into();
        self
    }

    /// Set the statistics policy.
    pub fn with_statistics_policy(mut self, policy: StatisticsPolicy) -> Self {
        self.statistics_policy = policy;
        self
    }

    /// Enable run artifact recording under `root`.
    pub fn with_artifacts_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.artifacts_root = Some(root.into());
        self
    }
}

/// Configuration for the benchmark harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Items sampled per run (uniform, without replacement).
    pub sample_size: usize,

    /// A prediction within this error percentage counts as a success.
    pub success_threshold_pct: f64,

    /// Directory benchmark reports are persisted to; `None` disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_dir: Option<PathBuf>,

    /// Sampling seed for reproducible runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            sample_size: 10,
            success_threshold_pct: 15.0,
            results_dir: None,
            seed: None,
        }
    }
}

impl BenchmarkConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sample size.
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Set the success threshold.
    pub fn with_success_threshold_pct(mut self, pct: f64) -> Self {
        self.success_threshold_pct = pct;
        self
    }

    /// Persist reports under `dir`.
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(dir.into());
        self
    }

    /// Fix the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
