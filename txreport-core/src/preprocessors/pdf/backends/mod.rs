//! PDF Backend trait
//!
//! Defines the interface that all PDF page-text backends must implement.
//! Every backend returns one string per page, in document order.

use anyhow::Result;

/// Backend trait for PDF page-text extraction
pub trait PdfBackend: Send + Sync {
    /// Extract PDF bytes to per-page text (index 0 is page 1)
    fn extract_page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &str;

    /// Check if backend is healthy/ready
    fn is_healthy(&self) -> bool;
}

#[cfg(feature = "pdf-extract-backend")]
pub mod pdf_extract;

#[cfg(feature = "pdf-extract-backend")]
pub use self::pdf_extract::PdfExtractBackend;
