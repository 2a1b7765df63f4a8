//! Search-term construction with graceful degradation.
//!
//! Marketplace search engines are sensitive to over-long and over-specific
//! queries. Terms are produced most-specific-first and the orchestrator
//! stops at the first term a scraper answers, so degrading to shorter
//! variants materially improves hit rate.

use pricewatch_core::NormalizedProduct;

/// Category suffixes stripped from the product name to form its core.
/// Longest first so "eau de parfum" wins over "parfum".
const CATEGORY_SUFFIXES: &[&str] = &[
    "extrait de parfum",
    "eau de parfum intense",
    "eau de parfum",
    "eau de toilette",
    "eau de cologne",
    "parfum",
    "toilette",
    "cologne",
    "aftershave",
    "after shave",
    "vaporisateur",
    "spray",
    "vapo",
    "edp",
    "edt",
    "edc",
];

/// Terms longer than this get rejected by several site search engines.
const MAX_TERM_LEN: usize = 50;

/// Single-token terms (core name alone, brand alone) are only worth
/// trying when reasonably short.
const MAX_STANDALONE_LEN: usize = 30;

/// Builds the ordered search-term variants for a product.
///
/// Priority order: brand + core name, brand + core name + size (when the
/// size is meaningful), core name + brand, core name alone, brand alone.
/// Unusable terms (empty or over-long) are dropped; when nothing usable
/// remains, falls back to concatenating whatever fields exist.
#[must_use]
pub fn build_search_terms(product: &NormalizedProduct) -> Vec<String> {
    let brand = product.brand.trim();
    let core = core_product_name(&product.product_name);
    let size = meaningful_size(&product.variant_size);

    let mut terms: Vec<String> = Vec::new();
    let mut push = |term: String| {
        let term = term.trim().to_string();
        if !term.is_empty() && term.len() < MAX_TERM_LEN && !terms.contains(&term) {
            terms.push(term);
        }
    };

    if !brand.is_empty() && !core.is_empty() {
        push(format!("{brand} {core}"));
        if let Some(size) = size {
            push(format!("{brand} {core} {size}"));
        }
        push(format!("{core} {brand}"));
    }
    if !core.is_empty() && core.len() < MAX_STANDALONE_LEN {
        push(core.clone());
    }
    if !brand.is_empty() && brand.len() < MAX_STANDALONE_LEN {
        push(brand.to_string());
    }

    if terms.is_empty() {
        let fallback = [
            brand,
            product.product_name.trim(),
            product.variant_size.trim(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
        if !fallback.is_empty() {
            terms.push(fallback);
        }
    }

    terms
}

/// Strips category suffixes and collapses whitespace.
fn core_product_name(name: &str) -> String {
    let mut core = name.to_string();
    for suffix in CATEGORY_SUFFIXES {
        let lower = core.to_lowercase();
        if let Some(pos) = lower.find(suffix) {
            // Only strip whole words: the char before (if any) must be a
            // space and the match must end at a word boundary.
            let end = pos + suffix.len();
            let starts_ok = pos == 0 || lower.as_bytes()[pos - 1] == b' ';
            let ends_ok = end == lower.len() || lower.as_bytes()[end] == b' ';
            // Lowercasing keeps byte offsets for the character sets seen
            // in product names; the boundary check guards the exceptions.
            if starts_ok && ends_ok && core.is_char_boundary(pos) && core.is_char_boundary(end) {
                core.replace_range(pos..end, "");
            }
        }
    }
    core.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A size worth appending to a query. The degenerate `"1"` / `"1ml"`
/// placeholder from import mapping carries no information.
fn meaningful_size(variant_size: &str) -> Option<&str> {
    let size = variant_size.trim();
    if size.is_empty() || size == "1" || size.eq_ignore_ascii_case("1ml") {
        None
    } else {
        Some(size)
    }
}
