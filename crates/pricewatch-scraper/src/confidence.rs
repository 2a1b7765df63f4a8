//! Single-listing confidence heuristic.
//!
//! Used when only one site result exists and the matcher has not scored
//! the candidate yet. The score estimates how trustworthy the listing
//! itself looks, independent of any catalog product.

use rust_decimal::Decimal;

/// Titles at least this long usually carry brand + product + size and are
/// worth more trust than a truncated teaser.
const DESCRIPTIVE_TITLE_LEN: usize = 20;

/// Scores a scraped listing in `0.0..=1.0`.
///
/// Starts from 0.5 and adds: +0.2 for a descriptive title, +0.2 for a
/// valid positive price, +0.1 for a present availability signal, +0.1 for
/// a canonical product-URL shape, +0.1 for a plausible EAN.
#[must_use]
pub fn score_listing(
    title: &str,
    price: Option<Decimal>,
    has_availability_signal: bool,
    url: &str,
    ean: Option<&str>,
) -> f64 {
    let mut score: f64 = 0.5;

    if title.trim().len() >= DESCRIPTIVE_TITLE_LEN {
        score += 0.2;
    }
    if price.is_some_and(|p| p > Decimal::ZERO) {
        score += 0.2;
    }
    if has_availability_signal {
        score += 0.1;
    }
    if has_product_url_shape(url) {
        score += 0.1;
    }
    if ean.is_some_and(is_plausible_ean) {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

/// Canonical product URLs carry a product path segment or an item id, as
/// opposed to search/category pages.
fn has_product_url_shape(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_lowercase();
    ["/dp/", "/itm/", "/product", "/produkt", "/offersofproduct", "/p/"]
        .iter()
        .any(|fragment| path.contains(fragment))
}

/// EAN-8 or GTIN-12/13/14 length, digits only.
pub(crate) fn is_plausible_ean(ean: &str) -> bool {
    let len = ean.len();
    (len == 8 || (12..=14).contains(&len)) && ean.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn full_signals_reach_the_ceiling() {
        let score = score_listing(
            "Chanel N°5 Eau de Parfum 100ml Spray",
            Some(dec!(89.99)),
            true,
            "https://www.idealo.de/preisvergleich/OffersOfProduct/123",
            Some("8901030865736"),
        );
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bare_listing_scores_base_only() {
        let score = score_listing("N°5", None, false, "https://example.com/search?q=n5", None);
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn descriptive_title_adds_two_tenths() {
        let score = score_listing(
            "Dior Sauvage Eau de Toilette",
            None,
            false,
            "https://example.com/",
            None,
        );
        assert!((score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn amazon_dp_path_counts_as_product_url() {
        assert!(has_product_url_shape("https://www.amazon.de/dp/B00ABCDEF"));
    }

    #[test]
    fn search_page_is_not_a_product_url() {
        assert!(!has_product_url_shape("https://www.amazon.de/s?k=parfum"));
    }

    #[test]
    fn ean_lengths() {
        assert!(is_plausible_ean("12345678"));
        assert!(is_plausible_ean("8901030865736"));
        assert!(!is_plausible_ean("1234"));
        assert!(!is_plausible_ean("89010308657ab"));
        assert!(!is_plausible_ean("123456789"));
    }
}
