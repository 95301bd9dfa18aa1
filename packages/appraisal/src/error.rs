//! Typed errors for the appraisal library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Each collaborator gets its
//! own error enum so the loop can apply the right failure tier: analyzer
//! errors are fatal, everything else degrades the current round.

use thiserror::Error;

/// Errors that can occur during appraisal operations.
#[derive(Debug, Error)]
pub enum AppraisalError {
    /// Image analysis collaborator failed
    #[error("image analysis failed: {0}")]
    Analyzer(#[from] AnalyzerError),

    /// Marketplace scrape failed
    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    /// Listing evaluation failed
    #[error("evaluation failed: {0}")]
    Evaluator(#[from] EvaluatorError),

    /// Query generation failed
    #[error("query generation failed: {reason}")]
    QueryGeneration { reason: String },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// File IO error (corpus or artifact files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the image analysis collaborator.
///
/// Distinct from a structured `AnalysisOutcome::Error`, which is the
/// analyzer *rejecting* the images; both are treated as fatal by the loop.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Underlying vision service failed
    #[error("vision service error: {0}")]
    Service(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No image references were provided
    #[error("no images provided")]
    NoImages,
}

/// Errors from the marketplace scraper collaborator.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Marketplace unreachable or request failed
    #[error("marketplace error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Scraper finished with a non-success status
    #[error("scraper status: {status}")]
    BadStatus { status: String },

    /// Corpus file could not be written
    #[error("corpus write error: {0}")]
    CorpusWrite(#[source] std::io::Error),
}

/// Errors from the match evaluator collaborator.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// Underlying evaluation service failed
    #[error("evaluation service error: {0}")]
    Service(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Corpus file could not be read
    #[error("corpus read error: {0}")]
    CorpusRead(#[source] std::io::Error),
}

/// Result type alias for appraisal operations.
pub type Result<T> = std::result::Result<T, AppraisalError>;

/// Result type alias for image analysis.
pub type AnalyzerResult<T> = std::result::Result<T, AnalyzerError>;

/// Result type alias for scrape operations.
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for evaluation operations.
pub type EvaluatorResult<T> = std::result::Result<T, EvaluatorError>;
