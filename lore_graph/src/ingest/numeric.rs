//! Numbers embedded in cell text ("12,000 Runes", "6.5", "x3").

use regex::Regex;
use std::sync::LazyLock;

/// Keyword marking a drop entry as an amount of currency.
pub const CURRENCY_KEYWORD: &str = "runes";

static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| *c != ',' && *c != '_').collect()
}

/// Strip thousands separators and read the first run of digits.
pub fn first_integer(text: &str) -> Option<u64> {
    let stripped = strip_separators(text);
    let start = stripped.find(|c: char| c.is_ascii_digit())?;
    let run: String = stripped[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    run.parse().ok()
}

/// First decimal number in the text, separators stripped.
pub fn first_decimal(text: &str) -> Option<f64> {
    let stripped = strip_separators(text);
    DECIMAL_RE
        .find(&stripped)
        .and_then(|m| m.as_str().parse().ok())
}

/// What a single "drops" entry stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropEntry {
    /// An amount of currency.
    Quantity(u64),
    /// The display name of an item.
    Item(String),
}

/// Classify one drop entry.
///
/// Entries naming the currency keyword, or that are purely numeric once
/// separators are stripped, are quantities; anything else is an item name.
/// A currency entry with no digits carries no information and yields `None`.
pub fn classify_drop(text: &str) -> Option<DropEntry> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let stripped = strip_separators(text);
    let stripped = stripped.trim();
    if stripped.chars().all(|c| c.is_ascii_digit()) {
        return stripped.parse().ok().map(DropEntry::Quantity);
    }

    let names_currency = text
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case(CURRENCY_KEYWORD));
    if names_currency {
        return first_integer(text).map(DropEntry::Quantity);
    }

    Some(DropEntry::Item(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("12,000 Runes"), Some(12000));
        assert_eq!(first_integer("HP: 6,080 (NG+)"), Some(6080));
        assert_eq!(first_integer("x3"), Some(3));
        assert_eq!(first_integer("??"), None);
        assert_eq!(first_integer("-"), None);
    }

    #[test]
    fn test_first_decimal() {
        assert_eq!(first_decimal("6.5"), Some(6.5));
        assert_eq!(first_decimal("Weight 1,200.25 kg"), Some(1200.25));
        assert_eq!(first_decimal("-"), None);
    }

    #[test]
    fn test_classify_drop() {
        assert_eq!(classify_drop("2,000 Runes"), Some(DropEntry::Quantity(2000)));
        assert_eq!(classify_drop(" 480 "), Some(DropEntry::Quantity(480)));
        assert_eq!(classify_drop("runes"), None);
        assert_eq!(
            classify_drop("Golden Rune [1]"),
            Some(DropEntry::Item("Golden Rune [1]".to_string()))
        );
        assert_eq!(
            classify_drop("Remembrance of the Grafted"),
            Some(DropEntry::Item("Remembrance of the Grafted".to_string()))
        );
        assert_eq!(classify_drop(""), None);
    }
}
