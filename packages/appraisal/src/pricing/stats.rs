//! Price statistics over the current match set.

use serde::{Deserialize, Serialize};

/// Aggregate statistics over the parsed prices of a match set.
///
/// Derived data: recomputed from scratch every round, never updated in
/// place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    /// Number of matches with a positive, parseable price
    pub count: usize,

    /// Statistical median, rounded to 2 decimals
    pub median: f64,

    /// Arithmetic mean, rounded to 2 decimals
    pub average: f64,

    /// `"{min}-{max}"` with whole bounds rendered as integers; `"N/A"`
    /// when no price parsed
    pub range: String,

    /// The parsed prices, ascending
    pub valid_prices: Vec<f64>,
}

impl Default for PriceStatistics {
    fn default() -> Self {
        Self {
            count: 0,
            median: 0.0,
            average: 0.0,
            range: "N/A".to_string(),
            valid_prices: Vec::new(),
        }
    }
}

impl PriceStatistics {
    /// Compute statistics over a set of positive prices.
    ///
    /// Input order is irrelevant; prices are sorted ascending for a
    /// deterministic median and range.
    pub fn compute(prices: &[f64]) -> Self {
        if prices.is_empty() {
            return Self::default();
        }

        let mut sorted = prices.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        };
        let average = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let range = format!(
            "{}-{}",
            render_bound(sorted[0]),
            render_bound(sorted[sorted.len() - 1])
        );

        Self {
            count: sorted.len(),
            median: round2(median),
            average: round2(average),
            range,
            valid_prices: sorted,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 70.0 renders as "70", 70.5 as "70.5".
fn render_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
