//! Text normalization for keyword matching.
//!
//! Matching is exact-token: only whitespace separates words, so `"hello!"`
//! stays `"hello!"` and will not match the keyword `hello`.

/// Lowercase and trim raw input.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Split normalized input into whitespace-delimited tokens, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
