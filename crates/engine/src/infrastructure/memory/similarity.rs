//! Trigram similarity for fuzzy name matching.

use std::collections::HashSet;

/// Trigrams of each lowercase word, padded with two leading blanks and one
/// trailing blank.
fn trigrams(input: &str) -> HashSet<[char; 3]> {
    let mut grams = HashSet::new();
    for word in input
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  ".chars().chain(word.chars()).chain(" ".chars()).collect();
        for window in padded.windows(3) {
            grams.insert([window[0], window[1], window[2]]);
        }
    }
    grams
}

/// Shared trigrams over all trigrams, from 0.0 to 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (trigrams(a), trigrams(b));
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}
