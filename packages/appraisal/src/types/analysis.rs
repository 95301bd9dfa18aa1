//! Image analysis outcome types.

use serde::{Deserialize, Serialize};

/// Structured description of the appraised item, produced by the image
/// analysis collaborator from the input photographs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDescription {
    /// What the item is ("iPhone 12", "Eames lounge chair")
    pub item_name: String,

    /// Specific model or variant, when identifiable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Visible condition ("used, light scratches")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Free-text description of what the photographs show
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ItemDescription {
    /// Create a minimal description from an item name.
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            ..Default::default()
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// A search query derived directly from the description.
    ///
    /// Used when the query generator is unavailable, so a round never
    /// starts without a query.
    pub fn fallback_query(&self) -> String {
        match &self.model {
            Some(model) if !model.is_empty() => format!("{} {}", self.item_name, model),
            _ => self.item_name.clone(),
        }
    }
}

/// Wire contract of the image analyzer: a tagged success or a structured
/// rejection.
///
/// Decoded once when the analyzer responds; the loop never re-inspects
/// the raw payload. A rejection means the image set is inconsistent or
/// unusable and is the loop's only fatal path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum AnalysisOutcome {
    /// Analysis succeeded with a structured description.
    #[serde(rename = "SUCCESS")]
    Success(ItemDescription),

    /// The analyzer rejected the image set.
    #[serde(rename = "ERROR")]
    Error {
        /// Why the images could not be analyzed
        reason: String,
    },
}

impl AnalysisOutcome {
    /// Convert into the description, or the rejection reason.
    pub fn into_description(self) -> Result<ItemDescription, String> {
        match self {
            AnalysisOutcome::Success(description) => Ok(description),
            AnalysisOutcome::Error { reason } => Err(reason),
        }
    }

    /// Whether this outcome is a rejection.
    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisOutcome::Error { .. })
    }
}
