//! The three matching signals.
//!
//! Each signal reports `Some(score)` when it fires and `None` when it has
//! nothing to say about the candidate; the final score averages only the
//! fired signals so a missing EAN never dilutes a strong title match.

use pricewatch_core::NormalizedProduct;

use crate::similarity::{best_window_similarity, string_similarity, strip_stopwords};
use crate::size::size_texts_match;

/// How many trailing EAN digits still identify the article. Supplier
/// feeds sometimes truncate the country/manufacturer prefix.
const EAN_PARTIAL_LEN: usize = 8;

/// EAN signal: fires at full strength when the product's EAN — or its
/// last eight digits — appears inside the digit runs of the candidate
/// title.
#[must_use]
pub fn ean_signal(product: &NormalizedProduct, candidate_title: &str) -> Option<f64> {
    let ean = product.ean.as_deref()?;
    // Digit-only is a type invariant, but a malformed feed must not fire
    // false positives here.
    if ean.len() < EAN_PARTIAL_LEN || !ean.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let title_digits: String = candidate_title
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if title_digits.len() < EAN_PARTIAL_LEN {
        return None;
    }

    let tail = &ean[ean.len() - EAN_PARTIAL_LEN..];
    if title_digits.contains(ean) || title_digits.contains(tail) {
        Some(1.0)
    } else {
        None
    }
}

/// Brand+size signal: a tiered bonus for brand similarity inside the
/// candidate title, plus a fixed bonus when the variant sizes agree.
/// Fires only when at least one component contributes; capped at 1.0.
#[must_use]
pub fn brand_size_signal(product: &NormalizedProduct, candidate_title: &str) -> Option<f64> {
    let mut score: f64 = 0.0;

    let brand_similarity = best_window_similarity(&product.brand, candidate_title);
    if brand_similarity > 0.8 {
        score += 0.6;
    } else if brand_similarity > 0.6 {
        score += 0.4;
    } else if brand_similarity > 0.4 {
        score += 0.2;
    }

    if size_texts_match(&product.variant_size, candidate_title) {
        score += 0.4;
    }

    if score > 0.0 {
        Some(score.min(1.0))
    } else {
        None
    }
}

/// Fuzzy-title signal: normalized Levenshtein over stopword-stripped
/// names, boosted when the candidate title carries the brand verbatim.
/// Fires whenever both stripped strings are non-empty.
#[must_use]
pub fn title_signal(product: &NormalizedProduct, candidate_title: &str) -> Option<f64> {
    let product_name = strip_stopwords(&product.product_name);
    let candidate = strip_stopwords(candidate_title);
    if product_name.is_empty() || candidate.is_empty() {
        return None;
    }

    let mut score = string_similarity(&product_name, &candidate);

    if !product.brand.is_empty()
        && candidate_title
            .to_lowercase()
            .contains(&product.brand.to_lowercase())
    {
        score = (score + 0.2).min(1.0);
    }

    Some(score)
}
