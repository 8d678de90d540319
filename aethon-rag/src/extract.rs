//! PDF text extraction.
//!
//! Turns raw document bytes into ordered page text. Blank pages are
//! dropped; pages whose extraction fails are skipped and reported rather
//! than aborting the whole document.

use lopdf::Document as PdfDocument;
use tracing::{debug, warn};

use crate::error::{RagError, Result};

/// The extracted text of a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number within the source document.
    pub number: u32,
    /// The page's text with surrounding whitespace trimmed.
    pub text: String,
}

/// The page-ordered result of extracting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Pages that yielded text, in page order.
    pub pages: Vec<PageText>,
    /// 1-based numbers of pages that could not be extracted.
    pub skipped_pages: Vec<u32>,
}

impl ExtractedDocument {
    /// Number of pages that yielded text.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Render the full document text as `Page {n}:` blocks separated by
    /// blank lines. This is the exact form the chunker consumes.
    pub fn joined_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| format!("Page {}:\n{}", page.number, page.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Extract page-ordered text from raw PDF bytes.
///
/// # Errors
///
/// Returns [`RagError::Extraction`] if the bytes are not a well-formed PDF
/// or if no page yields any extractable text. Individual malformed pages
/// are skipped and recorded in [`ExtractedDocument::skipped_pages`].
pub fn extract_pages(bytes: &[u8]) -> Result<ExtractedDocument> {
    let doc = PdfDocument::load_mem(bytes)
        .map_err(|e| RagError::Extraction(format!("not a well-formed PDF: {e}")))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(RagError::Extraction("document contains no pages".to_string()));
    }

    let mut extracted = ExtractedDocument::default();
    for number in pages.keys().copied() {
        match doc.extract_text(&[number]) {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    debug!(page = number, "dropping blank page");
                } else {
                    extracted.pages.push(PageText { number, text: trimmed.to_string() });
                }
            }
            Err(e) => {
                warn!(page = number, error = %e, "skipping malformed page");
                extracted.skipped_pages.push(number);
            }
        }
    }

    if extracted.pages.is_empty() {
        return Err(RagError::Extraction("document contains no extractable text".to_string()));
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(matches!(extract_pages(b""), Err(RagError::Extraction(_))));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(extract_pages(b"this is not a pdf"), Err(RagError::Extraction(_))));
    }

    #[test]
    fn joined_text_numbers_pages() {
        let extracted = ExtractedDocument {
            pages: vec![
                PageText { number: 1, text: "alpha".to_string() },
                PageText { number: 3, text: "gamma".to_string() },
            ],
            skipped_pages: vec![2],
        };
        assert_eq!(extracted.joined_text(), "Page 1:\nalpha\n\nPage 3:\ngamma");
    }
}
