//! Price-string parsing for scraped listings.
//!
//! Marketplace price strings arrive in many shapes: `"89,99 €"`,
//! `"EUR 1.299,00"`, `"$1,299.00"`, `"ab 74,95€"`. The first plausible
//! number run is extracted, then the separator roles are decided from
//! their positions.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a scraped price string into an exact decimal.
///
/// Returns `None` for unparsable input and for zero prices — a zero-priced
/// listing is always a scrape artifact and is discarded by callers.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    // Grouped form first (1.299,00 / 1,299.00 / 1 299,00), plain run second.
    let re = Regex::new(r"\d{1,3}(?:[.,\s]\d{3})+(?:[.,]\d{1,2})?|\d+(?:[.,]\d{1,2})?")
        .expect("valid regex");
    let run = re.find(raw)?.as_str();

    let normalized = normalize_separators(run)?;
    let value = Decimal::from_str(&normalized).ok()?;
    if value <= Decimal::ZERO {
        return None;
    }
    Some(value)
}

/// Rewrites a digit/separator run into `1234.56` form.
///
/// Rules: with both `.` and `,` present, the rightmost one is the decimal
/// point. With a single separator, it is a decimal point when followed by
/// one or two digits and a thousands separator when followed by three.
fn normalize_separators(run: &str) -> Option<String> {
    let last_dot = run.rfind('.');
    let last_comma = run.rfind(',');

    let decimal_pos = match (last_dot, last_comma) {
        (Some(d), Some(c)) => Some(d.max(c)),
        (Some(p), None) | (None, Some(p)) => {
            let digits_after = run.len() - p - 1;
            if (1..=2).contains(&digits_after) {
                Some(p)
            } else {
                None
            }
        }
        (None, None) => None,
    };

    let mut normalized = String::with_capacity(run.len());
    for (i, c) in run.char_indices() {
        if c.is_ascii_digit() {
            normalized.push(c);
        } else if Some(i) == decimal_pos {
            normalized.push('.');
        }
        // Remaining separators are thousands grouping; dropped.
    }

    if normalized.is_empty() || normalized == "." {
        return None;
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_german_decimal_comma() {
        assert_eq!(parse_price("89,99 €"), Some(dec!(89.99)));
    }

    #[test]
    fn parses_german_thousands_and_decimal() {
        assert_eq!(parse_price("EUR 1.299,00"), Some(dec!(1299.00)));
    }

    #[test]
    fn parses_english_thousands_and_decimal() {
        assert_eq!(parse_price("$1,299.00"), Some(dec!(1299.00)));
    }

    #[test]
    fn parses_space_grouped_thousands() {
        assert_eq!(parse_price("1 299,00 zł"), Some(dec!(1299.00)));
    }

    #[test]
    fn parses_plain_integer_price() {
        assert_eq!(parse_price("120 €"), Some(dec!(120)));
    }

    #[test]
    fn parses_price_with_prefix_text() {
        assert_eq!(parse_price("ab 74,95€"), Some(dec!(74.95)));
    }

    #[test]
    fn single_separator_with_three_digits_is_thousands() {
        assert_eq!(parse_price("1.299 €"), Some(dec!(1299)));
        assert_eq!(parse_price("1,299"), Some(dec!(1299)));
    }

    #[test]
    fn single_decimal_digit_is_a_decimal() {
        assert_eq!(parse_price("7,5"), Some(dec!(7.5)));
    }

    #[test]
    fn rejects_zero_price() {
        assert_eq!(parse_price("0,00 €"), None);
    }

    #[test]
    fn rejects_text_without_digits() {
        assert_eq!(parse_price("Preis auf Anfrage"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn takes_first_price_when_several_appear() {
        // Current price followed by a strike-through original price.
        assert_eq!(parse_price("89,99 € statt 101,50 €"), Some(dec!(89.99)));
    }
}
