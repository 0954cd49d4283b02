//! crates/typespark_core/src/scoring.rs
//!
//! Accuracy and words-per-minute for a typed answer.
//!
//! Accuracy is positional: the first `L` characters of both strings are compared
//! index by index, so an insertion or deletion misaligns everything after it.
//! Speed is derived from the reference text's word count, never from what was typed.

use crate::domain::Score;

/// Upper bound on the number of characters compared.
pub const MAX_COMPARE_LENGTH: usize = 10_000;

/// Scores `typed` against `expected`. Never fails; degenerate input scores zero.
pub fn score(expected: &str, typed: &str, elapsed_seconds: f64) -> Score {
    Score {
        accuracy: accuracy(expected, typed),
        wpm: words_per_minute(expected, elapsed_seconds),
    }
}

fn accuracy(expected: &str, typed: &str) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    let mut compared = 0usize;
    let mut matches = 0usize;
    for (a, b) in expected.chars().zip(typed.chars()).take(MAX_COMPARE_LENGTH) {
        compared += 1;
        if a == b {
            matches += 1;
        }
    }
    matches as f64 / compared.max(1) as f64
}

fn words_per_minute(expected: &str, elapsed_seconds: f64) -> f64 {
    if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
        return 0.0;
    }
    let words = expected.split_whitespace().count();
    words as f64 / elapsed_seconds * 60.0
}
