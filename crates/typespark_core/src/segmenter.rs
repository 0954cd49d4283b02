//! crates/typespark_core/src/segmenter.rs
//!
//! Turns raw text into an ordered list of bounded practice items.
//! Segmentation is pure and deterministic apart from the freshly generated item ids.

use serde::{Deserialize, Serialize};

use crate::domain::StudyItem;

/// Appended to any item whose content had to be cut.
pub const TRUNCATION_MARKER: &str = " (truncated)";

/// Context label used when the caller does not provide one.
pub const DEFAULT_CONTEXT: &str = "Custom Text";

const SINGLE_ITEM_PROMPT: &str = "Type this text:";

/// Bounds applied while segmenting. Lengths count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationLimits {
    /// Inputs shorter than this become a single item.
    pub short_text_threshold: usize,
    /// A paragraph must be longer than this to become an item of its own.
    pub min_paragraph_chars: usize,
    pub max_items: usize,
    pub max_item_chars: usize,
}

impl Default for SegmentationLimits {
    fn default() -> Self {
        Self {
            short_text_threshold: 100,
            min_paragraph_chars: 10,
            max_items: 20,
            max_item_chars: 500,
        }
    }
}

impl SegmentationLimits {
    /// Clamps values that would make segmentation meaningless.
    pub fn validated(mut self) -> Self {
        self.max_items = self.max_items.max(1);
        self.max_item_chars = self.max_item_chars.max(TRUNCATION_MARKER.chars().count() + 1);
        self
    }
}

/// Segments `raw_text` into items labelled with the default context.
pub fn segment(raw_text: &str, limits: &SegmentationLimits) -> Vec<StudyItem> {
    segment_labeled(raw_text, limits, DEFAULT_CONTEXT)
}

/// Segments `raw_text` into items whose context is `context`.
///
/// Empty input yields no items; any other input yields at least one.
pub fn segment_labeled(raw_text: &str, limits: &SegmentationLimits, context: &str) -> Vec<StudyItem> {
    let limits = limits.clone().validated();
    if raw_text.is_empty() {
        return Vec::new();
    }

    let paragraphs = split_paragraphs(raw_text);
    if paragraphs.is_empty() || raw_text.chars().count() < limits.short_text_threshold {
        // Whitespace-only input is kept verbatim so the item is never empty.
        let whole = match raw_text.trim() {
            "" => raw_text,
            trimmed => trimmed,
        };
        return vec![single_item(whole, &limits, context)];
    }

    let kept: Vec<&String> = paragraphs
        .iter()
        .filter(|p| p.chars().count() > limits.min_paragraph_chars)
        .take(limits.max_items)
        .collect();

    if kept.is_empty() {
        let head: String = raw_text.trim().chars().take(limits.max_item_chars).collect();
        return vec![single_item(&head, &limits, context)];
    }

    let total = kept.len();
    kept.into_iter()
        .enumerate()
        .map(|(i, paragraph)| {
            StudyItem::text(
                format!("Type this paragraph ({}/{}):", i + 1, total),
                truncate_content(paragraph, limits.max_item_chars),
                context,
            )
        })
        .collect()
}

/// Cuts `text` so that it, marker included, fits in `max_chars` characters.
pub fn truncate_content(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(TRUNCATION_MARKER.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str(TRUNCATION_MARKER);
    out
}

fn single_item(text: &str, limits: &SegmentationLimits, context: &str) -> StudyItem {
    StudyItem::text(
        SINGLE_ITEM_PROMPT,
        truncate_content(text, limits.max_item_chars),
        context,
    )
}

/// Splits on runs of blank lines and trims each paragraph.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut paragraphs);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut paragraphs);
    paragraphs
}

fn flush(lines: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let paragraph = lines.join("\n");
    let trimmed = paragraph.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_string());
    }
    lines.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(word: &str, repeat: usize) -> String {
        vec![word; repeat].join(" ")
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(segment("", &SegmentationLimits::default()).is_empty());
    }

    #[test]
    fn short_text_becomes_single_item() {
        let items = segment("  The quick brown fox.  ", &SegmentationLimits::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "The quick brown fox.");
        assert_eq!(items[0].prompt, "Type this text:");
        assert_eq!(items[0].context, DEFAULT_CONTEXT);
    }

    #[test]
    fn whitespace_only_input_degrades_to_one_item() {
        let items = segment(" \n\n \t ", &SegmentationLimits::default());
        assert_eq!(items.len(), 1);
        assert!(!items[0].content.is_empty());
    }

    #[test]
    fn paragraphs_keep_order_and_number_prompts() {
        let first = paragraph("alpha", 10);
        let second = paragraph("beta", 10);
        let text = format!("{first}\n\n\n{second}\n");
        let items = segment(&text, &SegmentationLimits::default());

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].content, first);
        assert_eq!(items[1].content, second);
        assert_eq!(items[0].prompt, "Type this paragraph (1/2):");
        assert_eq!(items[1].prompt, "Type this paragraph (2/2):");
    }

    #[test]
    fn blank_lines_with_spaces_still_separate_paragraphs() {
        let text = format!("{}\n   \n{}", paragraph("one", 20), paragraph("two", 20));
        assert_eq!(segment(&text, &SegmentationLimits::default()).len(), 2);
    }

    #[test]
    fn short_paragraphs_are_skipped() {
        let long = paragraph("kept", 30);
        let text = format!("Title\n\n{long}\n\nEnd");
        let items = segment(&text, &SegmentationLimits::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, long);
    }

    #[test]
    fn all_short_paragraphs_fall_back_to_head_of_text() {
        let text = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join("\n\n");
        let limits = SegmentationLimits::default();
        let items = segment(&text, &limits);
        assert_eq!(items.len(), 1);
        assert!(items[0].content.starts_with("w0\n\nw1"));
        assert!(items[0].content.chars().count() <= limits.max_item_chars);
    }

    #[test]
    fn item_count_is_capped() {
        let text = (0..30)
            .map(|i| format!("Paragraph number {i} has enough text in it."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let limits = SegmentationLimits {
            max_items: 5,
            ..SegmentationLimits::default()
        };
        let items = segment(&text, &limits);
        assert_eq!(items.len(), 5);
        assert!(items[4].content.contains("number 4 "));
        assert_eq!(items[4].prompt, "Type this paragraph (5/5):");
    }

    #[test]
    fn long_items_are_truncated_with_marker() {
        let long = paragraph("lorem", 200);
        let text = format!("{long}\n\n{long}");
        let limits = SegmentationLimits {
            max_item_chars: 100,
            ..SegmentationLimits::default()
        };
        for item in segment(&text, &limits) {
            assert!(item.content.chars().count() <= 100);
            assert!(item.content.ends_with(TRUNCATION_MARKER));
        }
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(50);
        let cut = truncate_content(&text, 20);
        assert_eq!(cut.chars().count(), 20);
        assert!(cut.starts_with("éééé"));
    }

    #[test]
    fn segmentation_is_deterministic_apart_from_ids() {
        let text = format!("{}\n\n{}", paragraph("same", 12), paragraph("input", 12));
        let limits = SegmentationLimits::default();
        let a = segment(&text, &limits);
        let b = segment(&text, &limits);
        let strip = |items: &[StudyItem]| {
            items
                .iter()
                .map(|i| (i.prompt.clone(), i.content.clone(), i.context.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&a), strip(&b));
        assert_ne!(a[0].id, b[0].id);
    }

    #[test]
    fn custom_label_is_applied() {
        let items = segment_labeled("notes", &SegmentationLimits::default(), "notes.txt");
        assert_eq!(items[0].context, "notes.txt");
    }

    #[test]
    fn validated_clamps_degenerate_limits() {
        let limits = SegmentationLimits {
            short_text_threshold: 0,
            min_paragraph_chars: 0,
            max_items: 0,
            max_item_chars: 3,
        }
        .validated();
        assert_eq!(limits.max_items, 1);
        assert!(limits.max_item_chars > TRUNCATION_MARKER.chars().count());
    }
}
