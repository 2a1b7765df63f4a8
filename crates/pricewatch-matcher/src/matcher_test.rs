use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;

fn make_product() -> NormalizedProduct {
    NormalizedProduct {
        supplier_product_id: "SUP-001".to_string(),
        brand: "Chanel".to_string(),
        product_name: "N°5 Eau de Parfum".to_string(),
        variant_size: "100ml".to_string(),
        ean: Some("8901030865736".to_string()),
        wholesale_price: dec!(50.00),
        currency: "EUR".to_string(),
        pack_size: 1,
        supplier_name: "Grosshandel".to_string(),
        last_purchase_price: None,
        is_available: true,
    }
}

fn make_candidate(title: &str, price: Decimal) -> PriceScrapingResult {
    PriceScrapingResult {
        id: Uuid::new_v4(),
        supplier_product_id: "SUP-001".to_string(),
        source_id: Uuid::new_v4(),
        title: title.to_string(),
        merchant: None,
        url: "https://shop.example/p/1".to_string(),
        price,
        currency: "EUR".to_string(),
        price_includes_vat: true,
        shipping_cost: None,
        is_available: true,
        confidence: 0.5,
        is_lowest_price: false,
        scraped_at: Utc::now(),
        job_id: Uuid::new_v4(),
    }
}

/// A product whose only firing signal can be the EAN: brand and size are
/// absent and the name is all stopwords. Lets tests reason about exact
/// scores.
fn ean_only_product() -> NormalizedProduct {
    let mut product = make_product();
    product.brand = String::new();
    product.variant_size = String::new();
    product.product_name = "Eau de Parfum".to_string();
    product
}

// ---------------------------------------------------------------------------
// Threshold and ranking
// ---------------------------------------------------------------------------

#[test]
fn low_scoring_candidates_are_discarded_entirely() {
    let matcher = ProductMatcher::default();
    let product = make_product();
    let candidates = vec![
        make_candidate("Chanel N°5 Eau de Parfum 100ml", dec!(89.99)),
        make_candidate("Lattafa Asad Zanzibar 90ml", dec!(19.99)),
    ];

    let matched = matcher.find_matches(&product, candidates);
    assert_eq!(matched.scraped_results.len(), 1);
    assert!(matched.scraped_results[0].result.title.contains("Chanel"));
    let best = matched.best_match.as_ref().expect("expected a best match");
    assert!(best.result.title.contains("Chanel"));
}

#[test]
fn results_are_ranked_descending_and_best_is_top() {
    let matcher = ProductMatcher::default();
    let product = make_product();
    // Three candidates of clearly decreasing quality.
    let candidates = vec![
        make_candidate("Chanel Eau de Toilette Spray", dec!(30.00)),
        make_candidate("Chanel N°5 Eau de Parfum 100ml", dec!(89.99)),
        make_candidate("Chanel N°5 Parfum", dec!(120.00)),
    ];

    let matched = matcher.find_matches(&product, candidates);
    assert!(matched.scraped_results.len() >= 2);
    for pair in matched.scraped_results.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "results must be sorted descending: {} < {}",
            pair[0].score,
            pair[1].score
        );
    }
    let best = matched.best_match.as_ref().expect("expected a best match");
    assert_eq!(best.result.title, matched.scraped_results[0].result.title);
    assert!((matched.confidence - best.score).abs() < f64::EPSILON);
}

#[test]
fn no_candidates_yields_empty_match() {
    let matcher = ProductMatcher::default();
    let matched = matcher.find_matches(&make_product(), Vec::new());
    assert!(matched.scraped_results.is_empty());
    assert!(matched.best_match.is_none());
    assert!(matched.margin_opportunity_pct.is_none());
    assert!(matched.confidence.abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// Scoring details
// ---------------------------------------------------------------------------

#[test]
fn ean_only_candidate_scores_full_marks() {
    let matcher = ProductMatcher::default();
    let product = ean_only_product();
    let score = matcher.score_candidate(&product, "Art. 8901030865736 Original");
    assert!((score - 1.0).abs() < 1e-9);
}

#[test]
fn tester_penalty_is_subtracted_exactly() {
    let matcher = ProductMatcher::default();
    let product = ean_only_product();
    let clean = matcher.score_candidate(&product, "Art. 8901030865736 Original");
    let tester = matcher.score_candidate(&product, "Art. 8901030865736 Tester");
    assert!((clean - tester - 0.3).abs() < 1e-9);
}

#[test]
fn penalties_floor_at_zero() {
    let matcher = ProductMatcher::default();
    let product = ean_only_product();
    // Penalties sum far beyond the base score of 1.0.
    let score = matcher.score_candidate(
        &product,
        "Art. 8901030865736 Tester Sample Bundle Refill Mini Travel",
    );
    assert!(score.abs() < f64::EPSILON, "score must floor at 0, got {score}");
}

#[test]
fn unmatchable_candidate_scores_zero() {
    let matcher = ProductMatcher::default();
    let product = ean_only_product();
    // No EAN digits, no brand, nothing but stopwords in the product name:
    // no signal fires at all.
    let score = matcher.score_candidate(&product, "Eau de Parfum");
    assert!(score.abs() < f64::EPSILON);
}

#[test]
fn unfired_signals_do_not_dilute_the_average() {
    let matcher = ProductMatcher::default();
    let product = ean_only_product();
    // Only the EAN signal fires; a weighted average over fired signals
    // must give 1.0, not 1.0 * w_ean / (w_ean + w_brand + w_title).
    let score = matcher.score_candidate(&product, "8901030865736");
    assert!((score - 1.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Margin opportunity
// ---------------------------------------------------------------------------

#[test]
fn margin_opportunity_is_percentage_over_wholesale() {
    let matcher = ProductMatcher::default();
    let product = make_product(); // wholesale 50.00
    let candidates = vec![make_candidate("Chanel N°5 Eau de Parfum 100ml", dec!(89.99))];

    let matched = matcher.find_matches(&product, candidates);
    assert_eq!(matched.margin_opportunity_pct, Some(dec!(79.98)));
}

#[test]
fn margin_absent_for_zero_wholesale_price() {
    let matcher = ProductMatcher::default();
    let mut product = make_product();
    product.wholesale_price = Decimal::ZERO;
    let candidates = vec![make_candidate("Chanel N°5 Eau de Parfum 100ml", dec!(89.99))];

    let matched = matcher.find_matches(&product, candidates);
    assert!(matched.best_match.is_some());
    assert!(matched.margin_opportunity_pct.is_none());
}

#[test]
fn negative_margin_is_reported_not_hidden() {
    let matcher = ProductMatcher::default();
    let product = make_product(); // wholesale 50.00
    let candidates = vec![make_candidate("Chanel N°5 Eau de Parfum 100ml", dec!(40.00))];

    let matched = matcher.find_matches(&product, candidates);
    assert_eq!(matched.margin_opportunity_pct, Some(dec!(-20)));
}

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

#[test]
fn add_and_remove_penalty_rule() {
    let mut matcher = ProductMatcher::default();
    let product = ean_only_product();

    matcher.add_penalty_rule(PenaltyRule::new("b-ware", 0.5));
    let penalized = matcher.score_candidate(&product, "8901030865736 B-Ware");
    assert!((penalized - 0.5).abs() < 1e-9);

    assert!(matcher.remove_penalty_rule("b-ware"));
    let clean = matcher.score_candidate(&product, "8901030865736 B-Ware");
    assert!((clean - 1.0).abs() < 1e-9);

    assert!(!matcher.remove_penalty_rule("b-ware"), "already removed");
}

#[test]
fn update_config_changes_threshold() {
    let mut matcher = ProductMatcher::default();
    let mut config = MatcherConfig::default();
    config.min_score = 0.95;
    matcher.update_config(config);

    let product = make_product();
    // A decent but imperfect candidate that clears 0.3 easily.
    let candidates = vec![make_candidate("Chanel N°5 Parfum 100ml", dec!(89.99))];
    let matched = matcher.find_matches(&product, candidates);
    assert!(
        matched.best_match.is_none(),
        "raised threshold must discard the candidate"
    );
}
