//! Marketplace listing types.

use serde::{Deserialize, Deserializer, Serialize};

use crate::pricing::parser::parse_price;

/// A scraped marketplace listing.
///
/// Identity is `id`; immutable once scraped. Matches the corpus JSON the
/// scraper writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,

    pub title: String,

    /// Raw localized price string as shown on the listing page
    pub price: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: String,

    /// Local paths or URLs of the listing's photographs
    #[serde(default)]
    pub local_images: Vec<String>,
}

impl Listing {
    /// Create a listing with the fields the evaluator cares about.
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price: price.into(),
            description: String::new(),
            url: String::new(),
            local_images: Vec::new(),
        }
    }
}

/// Per-listing judgment from the evaluator.
///
/// Evaluator payloads are loose: ids arrive as strings or integers and
/// the match flag may be spelled `is_match` or `match_status`. Ids are
/// normalized to strings on decode and [`is_positive`](Self::is_positive)
/// folds both flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingVerdict {
    /// Listing identity, normalized to a string key
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_match: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_status: Option<bool>,

    /// Raw price string carried over from the listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    /// Per-listing note from the evaluator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ListingVerdict {
    /// A positive verdict, as produced by the evaluator for a match.
    pub fn matched(id: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_match: Some(true),
            match_status: None,
            price: Some(price.into()),
            feedback: None,
        }
    }

    /// A negative verdict.
    pub fn rejected(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_match: Some(false),
            match_status: None,
            price: None,
            feedback: None,
        }
    }

    /// Whether either match flag marks this listing as depicting the item.
    pub fn is_positive(&self) -> bool {
        self.is_match.unwrap_or(false) || self.match_status.unwrap_or(false)
    }

    /// The listing's price as a positive number, when it parses as one.
    pub fn parsed_price(&self) -> Option<f64> {
        self.price.as_deref().and_then(parse_price)
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Number(i64),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(text) => text,
        IdRepr::Number(number) => number.to_string(),
    })
}
