//! Image analysis collaborator contract.

use async_trait::async_trait;

use crate::error::AnalyzerResult;
use crate::types::analysis::AnalysisOutcome;

/// Vision collaborator that turns product photographs into a structured
/// item description.
///
/// Implementations wrap a vision-capable model or service. The loop sends
/// at most four image references (URLs or local paths) in display order.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Analyze an ordered set of product photographs.
    ///
    /// Returns the analyzer's tagged outcome: a structured description of
    /// the item, or an explicit rejection when the images are
    /// inconsistent or unusable. The caller treats a rejection — and any
    /// transport error — as fatal, since every search round depends on a
    /// trustworthy description.
    async fn analyze(&self, images: &[String]) -> AnalyzerResult<AnalysisOutcome>;
}
