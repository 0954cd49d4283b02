//! services/api/src/content.rs
//!
//! Built-in practice text, used for the quick start and whenever the
//! supplied content turns out to be blank.

pub const QUICK_START_LABEL: &str = "Quick Start";

pub const QUICK_START_TEXT: &str = "\
Typing well is less about speed than about rhythm. Keep your fingers resting on the home row and let each key come back to it.

Look at the screen, not at your hands. Mistakes will happen at first, and that is fine; accuracy builds the habits that speed later relies on.

Short, regular practice beats long, rare sessions. A few minutes every day will carry you further than an hour once a week.";

/// Returns the text to practice, substituting the quick start for blank input.
pub fn practice_text<'a>(raw_text: &'a str, label: &'a str) -> (&'a str, &'a str) {
    if raw_text.trim().is_empty() {
        (QUICK_START_TEXT, QUICK_START_LABEL)
    } else {
        (raw_text, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typespark_core::{segment, SegmentationLimits};

    #[test]
    fn blank_input_is_replaced() {
        assert_eq!(practice_text(" \n ", "notes.txt"), (QUICK_START_TEXT, QUICK_START_LABEL));
        assert_eq!(practice_text("hi", "notes.txt"), ("hi", "notes.txt"));
    }

    #[test]
    fn quick_start_splits_into_paragraph_items() {
        assert_eq!(segment(QUICK_START_TEXT, &SegmentationLimits::default()).len(), 3);
    }
}
