// Utility helpers for parsing raw fields and formatting counts.
//
// The raw export carries every field as text; these helpers turn blank or
// malformed values into `None` so the cleaning step can decide what to drop.
use num_format::{Locale, ToFormattedString};

/// Trim a string-like value and return `None` when it is missing or blank.
pub fn non_empty(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse a non-negative count.
///
/// - Trims whitespace.
/// - Accepts integral floats such as `"12.0"` (some exports write counts that way).
/// - Returns `None` for negatives, fractions and anything that is not a number.
pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    let s = non_empty(s)?;
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 {
        Some(f as u64)
    } else {
        None
    }
}

/// Group thousands with a space, the French way (`1 234 567`).
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en).replace(',', " ")
}

/// Number of characters in a name (not bytes: `"É"` is one letter).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
