//! Price string normalization.
//!
//! Marketplace prices arrive as free-form localized strings ("1.234,56 €",
//! "70 € VB", "Zu verschenken"). `parse_price` turns them into a positive
//! amount or nothing; it never fails loudly.

/// Marketplace conventions for "no usable price": placeholders, wanted
/// ads, and barter-only offers.
const NON_PRICE_MARKERS: &[&str] = &["N/A", "NULL", "SUCHE", "TAUSCH"];

/// Parse a localized price string into a positive amount.
///
/// Handles both European ("1.234,56") and US ("1,234.56") separator
/// conventions: when both separators appear, the one occurring later is
/// the decimal point and the other is dropped as a grouping mark; a lone
/// comma is a decimal point only when it sits within the last three
/// characters of the cleaned string. Returns `None` for blacklisted
/// markers, negative or non-positive amounts, and anything that fails to
/// parse.
pub fn parse_price(raw: &str) -> Option<f64> {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() || NON_PRICE_MARKERS.iter().any(|marker| upper.contains(marker)) {
        return None;
    }

    // A minus sign ahead of the first digit marks a negative amount,
    // which is never a valid asking price.
    let negative = upper
        .chars()
        .find(|c| c.is_ascii_digit() || *c == '-')
        .is_some_and(|c| c == '-');
    if negative {
        return None;
    }

    let cleaned: String = upper
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // European: dots group thousands, the trailing comma is decimal.
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        // US: commas group thousands, the dot is decimal.
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // Cents-like trailing comma ("1234,56").
        (Some(comma), None) if cleaned.len() - comma <= 3 => cleaned.replace(',', "."),
        // Grouping-only comma ("1,234").
        (Some(_), None) => cleaned.replace(',', ""),
        (None, _) => cleaned,
    };

    let value: f64 = normalized.parse().ok()?;
    (value > 0.0).then_some(value)
}
