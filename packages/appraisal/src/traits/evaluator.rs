//! Match evaluation collaborator contract.

use async_trait::async_trait;
use std::path::Path;

use crate::error::EvaluatorResult;
use crate::types::analysis::ItemDescription;

/// Judges which scraped listings depict the appraised item.
///
/// Returns the raw payload produced by the underlying service. The loop
/// decodes it into an [`EvaluationReport`](crate::types::evaluation::EvaluationReport)
/// exactly once at its boundary; downstream code never re-inspects the
/// raw payload. An undecodable payload becomes an empty report, keeping
/// the round alive.
#[async_trait]
pub trait MatchEvaluator: Send + Sync {
    /// Evaluate the corpus at `corpus_path` against the item description.
    async fn evaluate(
        &self,
        description: &ItemDescription,
        query: &str,
        feedback: &str,
        corpus_path: &Path,
    ) -> EvaluatorResult<serde_json::Value>;
}
