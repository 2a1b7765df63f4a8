//! String similarity primitives for fuzzy title matching.

/// Filler words stripped before title comparison. Fragrance category
/// suffixes dominate here because they appear in almost every listing
/// title without distinguishing the product.
const STOPWORDS: &[&str] = &[
    "eau", "de", "parfum", "toilette", "cologne", "edp", "edt", "edc", "spray", "vapo",
    "vaporisateur", "the", "for", "und", "and", "für", "men", "women", "herren", "damen", "ml",
];

/// Normalized Levenshtein similarity in `0.0..=1.0`, case-insensitive.
#[must_use]
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    let distance = levenshtein_distance(&a_chars, &b_chars);

    #[allow(clippy::cast_precision_loss)]
    let similarity = 1.0 - (distance as f64 / max_len as f64);
    similarity
}

/// Two-row Levenshtein over char slices.
fn levenshtein_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution_cost = usize::from(ca != cb);
            current[j + 1] = (previous[j] + substitution_cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Removes stopwords and collapses whitespace, lowercased.
#[must_use]
pub fn strip_stopwords(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| !STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best similarity between `needle` and any window of consecutive words in
/// `haystack` with the same word count as `needle`. Used to find a brand
/// inside a full listing title without the title length washing the score
/// out.
#[must_use]
pub fn best_window_similarity(needle: &str, haystack: &str) -> f64 {
    let needle_words: Vec<&str> = needle.split_whitespace().collect();
    let haystack_words: Vec<&str> = haystack.split_whitespace().collect();

    if needle_words.is_empty() || haystack_words.is_empty() {
        return 0.0;
    }
    if haystack_words.len() < needle_words.len() {
        return string_similarity(needle, haystack);
    }

    let window = needle_words.len();
    let mut best: f64 = 0.0;
    for chunk in haystack_words.windows(window) {
        let candidate = chunk.join(" ");
        best = best.max(string_similarity(needle, &candidate));
    }
    best
}
