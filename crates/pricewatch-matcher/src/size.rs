//! Unit-aware size extraction and comparison.

use regex::Regex;

/// Measurement dimension a size token belongs to. Volumes and masses are
/// never compared against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Volume,
    Mass,
}

/// A size normalized to its base unit (ml for volume, g for mass).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSize {
    pub value: f64,
    pub dimension: Dimension,
}

/// Relative difference tolerated between two sizes. Shops round
/// (100 ml vs 104 ml tester fills), so exact equality would miss real
/// matches.
const SIZE_TOLERANCE: f64 = 0.05;

/// Extracts the first size token (`100ml`, `1,5 l`, `50 g`, `1kg`) from a
/// text, normalized to base units.
#[must_use]
pub fn parse_size(text: &str) -> Option<NormalizedSize> {
    let re = Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(ml|l|g|kg)\b").expect("valid regex");
    let captures = re.captures(text)?;

    let raw_value = captures.get(1)?.as_str().replace(',', ".");
    let value: f64 = raw_value.parse().ok()?;
    let unit = captures.get(2)?.as_str().to_lowercase();

    let normalized = match unit.as_str() {
        "ml" => NormalizedSize {
            value,
            dimension: Dimension::Volume,
        },
        "l" => NormalizedSize {
            value: value * 1_000.0,
            dimension: Dimension::Volume,
        },
        "g" => NormalizedSize {
            value,
            dimension: Dimension::Mass,
        },
        "kg" => NormalizedSize {
            value: value * 1_000.0,
            dimension: Dimension::Mass,
        },
        _ => return None,
    };
    Some(normalized)
}

/// Whether two sizes agree: same dimension, magnitudes within the
/// tolerance of the larger value.
#[must_use]
pub fn sizes_match(a: NormalizedSize, b: NormalizedSize) -> bool {
    if a.dimension != b.dimension {
        return false;
    }
    let larger = a.value.max(b.value);
    if larger <= 0.0 {
        return false;
    }
    ((a.value - b.value).abs() / larger) <= SIZE_TOLERANCE
}

/// Convenience: parse both texts and compare.
#[must_use]
pub fn size_texts_match(a: &str, b: &str) -> bool {
    match (parse_size(a), parse_size(b)) {
        (Some(sa), Some(sb)) => sizes_match(sa, sb),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_millilitres() {
        let size = parse_size("Eau de Parfum 100ml Spray").unwrap();
        assert!((size.value - 100.0).abs() < f64::EPSILON);
        assert_eq!(size.dimension, Dimension::Volume);
    }

    #[test]
    fn parses_litres_to_millilitres() {
        let size = parse_size("1,5 l Nachfüllung").unwrap();
        assert!((size.value - 1_500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_kilograms_to_grams() {
        let size = parse_size("1kg Dose").unwrap();
        assert!((size.value - 1_000.0).abs() < f64::EPSILON);
        assert_eq!(size.dimension, Dimension::Mass);
    }

    #[test]
    fn no_size_token_is_none() {
        assert!(parse_size("Chanel N°5").is_none());
    }

    #[test]
    fn within_five_percent_matches() {
        assert!(size_texts_match("100ml", "104ml"));
    }

    #[test]
    fn beyond_five_percent_does_not_match() {
        assert!(!size_texts_match("100ml", "120ml"));
    }

    #[test]
    fn litre_and_millilitre_forms_match() {
        assert!(size_texts_match("1l", "1000ml"));
    }

    #[test]
    fn volume_never_matches_mass() {
        assert!(!size_texts_match("100ml", "100g"));
    }

    #[test]
    fn ml_token_is_preferred_over_bare_l_suffix() {
        // "100ml" must parse as ml, not as "0l" or similar.
        let size = parse_size("100ml").unwrap();
        assert!((size.value - 100.0).abs() < f64::EPSILON);
    }
}
