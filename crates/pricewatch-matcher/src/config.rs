use serde::{Deserialize, Serialize};

/// A title pattern that lowers a candidate's score: testers, gift sets,
/// and travel sizes are priced differently from the regular retail item
/// and would otherwise look like bargains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRule {
    /// Lowercase fragment searched in the candidate title.
    pub pattern: String,
    pub penalty: f64,
}

impl PenaltyRule {
    #[must_use]
    pub fn new(pattern: impl Into<String>, penalty: f64) -> Self {
        Self {
            pattern: pattern.into(),
            penalty,
        }
    }
}

/// Matcher tuning. Mutable at runtime through
/// [`crate::ProductMatcher::update_config`] and the penalty-rule methods,
/// so scoring can be adjusted without redeploying scrapers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub ean_weight: f64,
    pub brand_size_weight: f64,
    pub title_weight: f64,
    /// Candidates at or below this score are discarded outright.
    pub min_score: f64,
    pub penalty_rules: Vec<PenaltyRule>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            ean_weight: 1.0,
            brand_size_weight: 0.9,
            title_weight: 0.7,
            min_score: 0.3,
            penalty_rules: vec![
                PenaltyRule::new("tester", 0.3),
                PenaltyRule::new("gift set", 0.25),
                PenaltyRule::new("geschenkset", 0.25),
                PenaltyRule::new("bundle", 0.2),
                PenaltyRule::new("refill", 0.2),
                PenaltyRule::new("nachfüllung", 0.2),
                PenaltyRule::new("sample", 0.3),
                PenaltyRule::new("probe", 0.3),
                PenaltyRule::new("mini", 0.15),
                PenaltyRule::new("travel", 0.15),
            ],
        }
    }
}

impl MatcherConfig {
    /// Total penalty for a candidate title: the sum over all rules whose
    /// pattern occurs in the lowercased title.
    #[must_use]
    pub fn penalty_for(&self, title: &str) -> f64 {
        let lower = title.to_lowercase();
        self.penalty_rules
            .iter()
            .filter(|rule| lower.contains(&rule.pattern))
            .map(|rule| rule.penalty)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_rank_ean_highest() {
        let config = MatcherConfig::default();
        assert!(config.ean_weight > config.brand_size_weight);
        assert!(config.brand_size_weight > config.title_weight);
        assert!((config.min_score - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn penalty_sums_all_matching_rules() {
        let config = MatcherConfig::default();
        // "tester" (0.3) + "mini" (0.15)
        let penalty = config.penalty_for("Chanel N°5 Tester Mini 5ml");
        assert!((penalty - 0.45).abs() < 1e-9);
    }

    #[test]
    fn penalty_zero_for_clean_title() {
        let config = MatcherConfig::default();
        assert!(config.penalty_for("Chanel N°5 Eau de Parfum 100ml").abs() < f64::EPSILON);
    }

    #[test]
    fn penalty_matches_case_insensitively() {
        let config = MatcherConfig::default();
        assert!((config.penalty_for("ORIGINAL TESTER OVP") - 0.3).abs() < 1e-9);
    }
}
