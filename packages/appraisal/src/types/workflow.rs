//! Loop result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::analysis::ItemDescription;
use crate::pricing::stats::PriceStatistics;

/// One completed refinement round.
///
/// Immutable once appended to the run history. `round` is 1-indexed;
/// rounds skipped for lack of a corpus leave gaps in the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub round: usize,

    /// The search query this round ran with
    pub query: String,

    /// Raw evaluator payload as received, before decoding
    pub evaluation: Value,

    pub count_positive: usize,

    pub count_negative: usize,

    pub total_listings: usize,

    /// Share of the corpus judged to depict the item, 0..=100
    pub match_percentage: f64,

    /// Statistics over the match set selected by the configured policy
    pub price_statistics: PriceStatistics,
}

/// Terminal artifact of one loop run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    /// True when a round reached a "sufficient" verdict
    pub success: bool,

    /// Round index of the best iteration, 0 when every round was skipped
    /// or the run ended fatally
    pub best_iteration: usize,

    /// The best round's record, when any round completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<IterationRecord>,

    /// Completed rounds in order
    pub history: Vec<IterationRecord>,

    /// Fatal failure reason; only image analysis sets this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<ItemDescription>,
}

impl WorkflowResult {
    /// A run aborted by the fatal path: image analysis rejected the input.
    pub(crate) fn fatal(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            best_iteration: 0,
            best: None,
            history: Vec::new(),
            error: Some(reason.into()),
            item_description: None,
        }
    }

    /// A run that finished the loop, successfully or not.
    pub(crate) fn finished(
        success: bool,
        best: Option<IterationRecord>,
        history: Vec<IterationRecord>,
        description: ItemDescription,
    ) -> Self {
        Self {
            success,
            best_iteration: best.as_ref().map_or(0, |record| record.round),
            best,
            history,
            error: None,
            item_description: Some(description),
        }
    }

    /// Whether the run ended on the fatal path.
    pub fn is_fatal(&self) -> bool {
        self.error.is_some()
    }

    /// Price predicted by the best round's statistics.
    ///
    /// Prefers the mean, falls back to the median, then to 0.0 — so a
    /// run without a single priced match predicts nothing rather than
    /// failing.
    pub fn predicted_price(&self) -> f64 {
        let Some(stats) = self.best.as_ref().map(|record| &record.price_statistics) else {
            return 0.0;
        };
        if stats.average > 0.0 {
            stats.average
        } else if stats.median > 0.0 {
            stats.median
        } else {
            0.0
        }
    }
}
