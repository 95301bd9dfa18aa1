//! Cross-round match deduplication.

use indexmap::IndexMap;

use crate::types::listing::ListingVerdict;

/// The deduplicated union of all matching verdicts seen across rounds.
///
/// Keyed by listing id with last-write-wins semantics: re-evaluating a
/// listing in a later round replaces the earlier verdict while keeping
/// its first-seen position. Non-matching verdicts are never stored.
#[derive(Debug, Default)]
pub struct MatchAccumulator {
    matches: IndexMap<String, ListingVerdict>,
}

impl MatchAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one round's verdicts, keeping only the positive ones.
    pub fn absorb<'a>(&mut self, verdicts: impl IntoIterator<Item = &'a ListingVerdict>) {
        for verdict in verdicts {
            if verdict.is_positive() {
                self.matches.insert(verdict.id.clone(), verdict.clone());
            }
        }
    }

    /// The current cumulative match set, in first-seen order.
    pub fn matches(&self) -> impl Iterator<Item = &ListingVerdict> {
        self.matches.values()
    }

    /// Positive parsed prices of the cumulative set, ready for
    /// [`PriceStatistics::compute`](crate::pricing::stats::PriceStatistics::compute).
    /// Unparsable prices are excluded, never zero-filled.
    pub fn parsed_prices(&self) -> Vec<f64> {
        self.matches
            .values()
            .filter_map(ListingVerdict::parsed_price)
            .collect()
    }

    /// Number of distinct matched listings.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether no listing has matched yet.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
