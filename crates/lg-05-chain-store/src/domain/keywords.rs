//! Search keyword extraction and normalisation.

use std::collections::HashSet;

/// Lower-cased alphanumeric tokens of at least `min_len` characters, in
/// order of first appearance, deduplicated, at most `max` of them.
pub fn extract_auto_keywords(text: &str, min_len: usize, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= min_len)
        .map(str::to_lowercase)
        .filter(|token| seen.insert(token.clone()))
        .take(max)
        .collect()
}

/// Trim, lower-case and deduplicate caller keywords, dropping empties.
pub fn normalize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Normalise a category; blank becomes `None`.
pub fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
}
