//! Evaluator payload decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::listing::ListingVerdict;

/// Decoded evaluator payload for one round.
///
/// Every field is defaulted so a partial payload still decodes;
/// [`from_payload`](Self::from_payload) returns `None` only when the
/// payload is not an object of this shape, in which case the loop
/// substitutes `EvaluationReport::default()` (zero matches) and keeps
/// going.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Per-listing verdicts
    #[serde(default)]
    pub individual_results_evaluation: Vec<ListingVerdict>,

    /// Pre-aggregated counts; recomputed from the verdicts when absent
    #[serde(default)]
    pub count_positive: Option<usize>,

    #[serde(default)]
    pub count_negative: Option<usize>,

    #[serde(default)]
    pub total_listings: Option<usize>,

    /// Share of the corpus judged to depict the item, 0..=100
    #[serde(default)]
    pub match_percentage: Option<f64>,

    /// `"sufficient"` when enough confident matches exist to stop
    #[serde(default)]
    pub overall_sufficiency: Option<String>,

    /// Free-text advice for the next round's query
    #[serde(default)]
    pub query_improvement_feedback: Option<String>,
}

/// Match counts for one round, with absent fields resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationCounts {
    pub positive: usize,
    pub negative: usize,
    pub total: usize,
}

impl EvaluationReport {
    /// Decode a raw evaluator payload.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }

    /// The verdicts flagged as matches.
    pub fn positive_verdicts(&self) -> impl Iterator<Item = &ListingVerdict> {
        self.individual_results_evaluation
            .iter()
            .filter(|verdict| verdict.is_positive())
    }

    /// Counts as reported by the evaluator, recomputed from the
    /// individual verdicts where the payload omitted them.
    pub fn resolved_counts(&self) -> EvaluationCounts {
        let positive = self
            .count_positive
            .unwrap_or_else(|| self.positive_verdicts().count());
        let negative = self.count_negative.unwrap_or_else(|| {
            self.individual_results_evaluation
                .iter()
                .filter(|verdict| !verdict.is_positive())
                .count()
        });
        let total = self.total_listings.unwrap_or(positive + negative);

        EvaluationCounts {
            positive,
            negative,
            total,
        }
    }

    /// The reported match percentage, zero when absent.
    pub fn match_percentage(&self) -> f64 {
        self.match_percentage.unwrap_or(0.0)
    }

    /// Whether the evaluator judged the match set sufficient to stop.
    pub fn is_sufficient(&self) -> bool {
        matches!(self.overall_sufficiency.as_deref(), Some("sufficient"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_payload_decodes() {
        let payload = json!({
            "individual_results_evaluation": [
                {"id": "1", "is_match": true, "price": "50 €"},
                {"id": 2, "is_match": false, "price": "999 €"},
            ],
            "count_positive": 1,
            "count_negative": 1,
            "total_listings": 2,
            "match_percentage": 50,
            "overall_sufficiency": "sufficient",
            "query_improvement_feedback": "add the model number",
        });

        let report = EvaluationReport::from_payload(&payload).unwrap();
        assert_eq!(report.resolved_counts().positive, 1);
        assert_eq!(report.match_percentage(), 50.0);
        assert!(report.is_sufficient());
        assert_eq!(report.positive_verdicts().count(), 1);
    }

    #[test]
    fn missing_counts_resolve_from_verdicts() {
        let payload = json!({
            "individual_results_evaluation": [
                {"id": "1", "is_match": true, "price": "50 €"},
                {"id": "2", "is_match": true, "price": "60 €"},
                {"id": "3", "is_match": false},
            ],
        });

        let report = EvaluationReport::from_payload(&payload).unwrap();
        let counts = report.resolved_counts();
        assert_eq!(counts.positive, 2);
        assert_eq!(counts.negative, 1);
        assert_eq!(counts.total, 3);
        assert_eq!(report.match_percentage(), 0.0);
        assert!(!report.is_sufficient());
    }

    #[test]
    fn non_object_payloads_do_not_decode() {
        assert!(EvaluationReport::from_payload(&json!("free-form text")).is_none());
        assert!(EvaluationReport::from_payload(&Value::Null).is_none());
        assert!(EvaluationReport::from_payload(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn sufficiency_is_exact() {
        let payload = json!({"overall_sufficiency": "not sufficient"});
        let report = EvaluationReport::from_payload(&payload).unwrap();
        assert!(!report.is_sufficient());
    }
}
