use crate::error::{Error, Result};
use crate::extractor::r#trait::TextExtractor;
use crate::models::Page;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// PDF text extractor.
///
/// Text is pulled page by page with lopdf. When lopdf yields nothing but
/// blank pages, pdf-extract is tried over the whole file before giving up.
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Blocking extraction, run on the blocking pool by `extract`
    fn extract_pages(path: &Path) -> Result<Vec<Page>> {
        let doc = lopdf::Document::load(path).map_err(|e| Error::Extraction {
            path: path.to_path_buf(),
            reason: format!("not a readable PDF: {}", e),
        })?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(Error::Extraction {
                path: path.to_path_buf(),
                reason: "no pages found; the PDF may be empty or corrupted".to_string(),
            });
        }

        let mut pages = Vec::with_capacity(page_numbers.len());
        for number in page_numbers {
            let text = match doc.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), page = number, error = %e, "Failed to decode page text");
                    String::new()
                }
            };
            pages.push(Page::new(number as usize, text));
        }

        if pages.iter().all(Page::is_blank) {
            debug!(path = %path.display(), "lopdf produced only blank pages, trying pdf-extract");
            if let Some(fallback) = Self::extract_with_pdf_extract(path) {
                pages = fallback;
            }
        }

        if pages.iter().all(Page::is_blank) {
            return Err(Error::EmptyContent {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), pages = pages.len(), "Extracted PDF text");
        Ok(pages)
    }

    /// Whole-document fallback. Form feeds separate pages when the backend emits them.
    fn extract_with_pdf_extract(path: &Path) -> Option<Vec<Page>> {
        // pdf-extract panics on some malformed inputs
        let result = match std::panic::catch_unwind(|| pdf_extract::extract_text(path)) {
            Ok(result) => result,
            Err(_) => {
                warn!(path = %path.display(), "pdf-extract panicked during fallback extraction");
                return None;
            }
        };

        match result {
            Ok(text) if !text.trim().is_empty() => Some(
                text.split('\x0c')
                    .enumerate()
                    .map(|(i, page_text)| Page::new(i + 1, page_text))
                    .collect(),
            ),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "pdf-extract fallback failed");
                None
            }
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<Page>> {
        let owned: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::extract_pages(&owned))
            .await
            .map_err(|e| Error::Extraction {
                path: path.to_path_buf(),
                reason: format!("extraction task failed: {}", e),
            })?
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "pdf")
    }
}
