//! Text normalization for similarity computation.

use std::collections::HashSet;

use crate::stopwords::is_stop_word;

/// Splits `text` on whitespace, removes stopwords, and de-duplicates the
/// surviving tokens.
///
/// Tokens keep their original case; the stopword check is therefore
/// case-sensitive. The returned tokens are in first-occurrence order so the
/// downstream metrics are deterministic. An input that normalizes to nothing
/// yields an empty vector, which every metric accepts without failing.
pub fn normalize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for word in text.split_whitespace() {
        if is_stop_word(word) {
            continue;
        }
        if seen.insert(word) {
            tokens.push(word.to_string());
        }
    }

    tokens
}
