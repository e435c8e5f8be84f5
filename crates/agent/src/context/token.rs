//! Token estimation utilities.
//!
//! Uses a word-count heuristic: one whitespace-delimited word ≈ one token.
//! It undercounts for BPE tokenizers but is cheap, deterministic, and is
//! the unit the `max_context_tokens` budget is expressed in.

/// Estimate the token count for a string.
pub fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}
