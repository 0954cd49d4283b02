//! services/api/src/adapters/text_extractor.rs
//!
//! Implements the `DocumentTextExtractor` port for plain-text and PDF uploads.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};
use typespark_core::ports::{DocumentTextExtractor, PortError, PortResult};

use crate::adapters::pdf::extract_pdf_text;

pub const CONTENT_TRUNCATED_MARKER: &str = "\n\n[Content truncated: maximum content size reached]";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Turns `.txt` and `.pdf` uploads into practice text, stripping control
/// characters and capping the size.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    max_bytes: usize,
    max_pdf_pages: usize,
}

impl DocumentExtractor {
    pub fn new(max_bytes: usize, max_pdf_pages: usize) -> Self {
        Self {
            max_bytes,
            max_pdf_pages: max_pdf_pages.max(1),
        }
    }
}

//=========================================================================================
// `DocumentTextExtractor` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentTextExtractor for DocumentExtractor {
    async fn extract_text(&self, file_name: &str, data: &[u8]) -> PortResult<String> {
        let extension = file_extension(file_name).unwrap_or_default();
        let text = match extension.as_str() {
            "txt" => std::str::from_utf8(data)
                .map_err(|e| PortError::Unsupported(format!("file is not valid UTF-8 text: {}", e)))?
                .to_string(),
            "pdf" => {
                // Parsing is CPU-bound, keep it off the async workers.
                let data = data.to_vec();
                let max_pages = self.max_pdf_pages;
                tokio::task::spawn_blocking(move || extract_pdf_text(&data, max_pages))
                    .await
                    .map_err(|e| PortError::Unexpected(format!("PDF extraction task failed: {}", e)))??
            }
            _ => {
                warn!("Rejected upload with extension {:?}", extension);
                return Err(PortError::Unsupported(format!(
                    "'{}' is not an allowed file type",
                    file_name
                )));
            }
        };

        let cleaned = strip_control_chars(&text);
        let capped = cap_size(&cleaned, self.max_bytes);

        info!(
            "Extracted {} characters from {}",
            capped.chars().count(),
            file_name
        );
        Ok(capped)
    }
}

/// Reduces an uploaded file name to a safe label: ASCII letters, digits, `.`, `_` and `-`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "untitled.txt".to_string()
    } else {
        trimmed.to_string()
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

fn strip_control_chars(text: &str) -> String {
    static CONTROL: OnceLock<Regex> = OnceLock::new();
    let re = CONTROL.get_or_init(|| {
        Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("control character pattern is valid")
    });
    re.replace_all(text, "").into_owned()
}

fn cap_size(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &text[..end], CONTENT_TRUNCATED_MARKER)
}
