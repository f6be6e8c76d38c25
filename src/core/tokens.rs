//! Token estimation for LLM context budgeting
//!
//! The budget renderer needs a cheap, fully deterministic estimate so that
//! identical inputs always produce identical selections. A fixed
//! 4-chars-per-token heuristic is used instead of a BPE tokenizer: real
//! encodings drift between model families, and the selection logic only
//! needs a stable cost function.

/// Estimate the token count of `text` using the 4 chars-per-token heuristic.
///
/// Empty text counts as a single token (an entry is never free), and any
/// non-empty text costs at least one token.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 1;
    }
    text.chars().count().div_ceil(4).max(1)
}
