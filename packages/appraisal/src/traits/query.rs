//! Search query generation collaborator contract.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::analysis::ItemDescription;

/// Generates marketplace search queries from an item description and the
/// previous round's evaluator feedback.
#[async_trait]
pub trait QueryGenerator: Send + Sync {
    /// Produce the next search query.
    ///
    /// `feedback` is empty for the initial query and carries the
    /// evaluator's `query_improvement_feedback` on later rounds.
    /// Implementations decode their service's `{search_query}` wire shape
    /// and return the bare query text.
    async fn generate(&self, description: &ItemDescription, feedback: &str) -> Result<String>;
}
