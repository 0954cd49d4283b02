//! services/api/src/adapters/pdf.rs
//!
//! Page-limited text extraction from PDF documents, backed by `lopdf`.

use lopdf::Document;
use tracing::{info, warn};
use typespark_core::ports::{PortError, PortResult};

/// Extracts the text of the first `max_pages` pages of a PDF.
///
/// Pages are separated by a blank line so each one segments as its own
/// paragraph. A page whose text cannot be decoded is skipped. When the
/// document has more pages than `max_pages` a truncation notice is appended.
pub fn extract_pdf_text(data: &[u8], max_pages: usize) -> PortResult<String> {
    let document = Document::load_mem(data)
        .map_err(|e| PortError::Unsupported(format!("could not read PDF: {}", e)))?;

    let pages = document.get_pages();
    let total_pages = pages.len();
    info!("PDF has {} pages, reading at most {}", total_pages, max_pages);

    let mut page_texts = Vec::new();
    for (&page_number, _) in pages.iter().take(max_pages) {
        match document.extract_text(&[page_number]) {
            Ok(text) => page_texts.push(text.trim().to_string()),
            Err(e) => warn!("Skipping PDF page {}: {}", page_number, e),
        }
    }

    let mut text = page_texts.join("\n\n");
    if total_pages > max_pages {
        text.push_str(&format!(
            "\n\n[Content truncated: only the first {} pages were processed]",
            max_pages
        ));
    }
    Ok(text)
}
