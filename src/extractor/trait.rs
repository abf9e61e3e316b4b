use crate::error::Result;
use crate::models::Page;
use std::path::Path;

/// Trait for text extractors that turn a document into ordered page texts
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text of every page, in document order.
    ///
    /// Fails with `Error::Extraction` when the file cannot be read, is not a
    /// valid document or has no pages, and with `Error::EmptyContent` when
    /// every page is blank.
    async fn extract(&self, path: &Path) -> Result<Vec<Page>>;

    /// Check if this extractor supports the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}
