//! PDF Preprocessor
//!
//! Main preprocessor for PDF documents. Uses pluggable backends to extract
//! per-page text, then numbers the pages for the extraction core.

pub mod backends;

use crate::preprocessors::traits::{has_extension, Preprocessor};
use crate::types::PageText;
use anyhow::Result;
use std::path::Path;

pub use backends::PdfBackend;

#[cfg(feature = "pdf-extract-backend")]
pub use backends::PdfExtractBackend;

/// PDF files start with this marker (possibly after a few junk bytes)
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Backend enum for runtime backend selection
pub enum PdfBackendImpl {
    #[cfg(feature = "pdf-extract-backend")]
    PdfExtract(PdfExtractBackend),
    /// Caller-supplied backend (other engines, test doubles)
    Custom(Box<dyn PdfBackend>),
}

impl PdfBackend for PdfBackendImpl {
    fn extract_page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>> {
        match self {
            #[cfg(feature = "pdf-extract-backend")]
            PdfBackendImpl::PdfExtract(backend) => backend.extract_page_texts(pdf_bytes),
            PdfBackendImpl::Custom(backend) => backend.extract_page_texts(pdf_bytes),
        }
    }

    fn name(&self) -> &str {
        match self {
            #[cfg(feature = "pdf-extract-backend")]
            PdfBackendImpl::PdfExtract(backend) => backend.name(),
            PdfBackendImpl::Custom(backend) => backend.name(),
        }
    }

    fn is_healthy(&self) -> bool {
        match self {
            #[cfg(feature = "pdf-extract-backend")]
            PdfBackendImpl::PdfExtract(backend) => backend.is_healthy(),
            PdfBackendImpl::Custom(backend) => backend.is_healthy(),
        }
    }
}

/// PDF Preprocessor with pluggable backend
pub struct PdfPreprocessor {
    backend: PdfBackendImpl,
}

impl PdfPreprocessor {
    /// Create PdfPreprocessor with the pure-Rust pdf-extract backend
    #[cfg(feature = "pdf-extract-backend")]
    pub fn new_with_pdf_extract() -> Self {
        Self {
            backend: PdfBackendImpl::PdfExtract(PdfExtractBackend::new()),
        }
    }

    /// Create PdfPreprocessor around any backend
    pub fn new_with_backend(backend: Box<dyn PdfBackend>) -> Self {
        Self {
            backend: PdfBackendImpl::Custom(backend),
        }
    }

    /// Get the backend name for logging
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Check if the backend is healthy
    pub fn is_healthy(&self) -> bool {
        self.backend.is_healthy()
    }
}

/// Cheap structural check before handing bytes to a backend.
/// The header may be preceded by up to 1024 bytes of junk.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(1024 + PDF_MAGIC.len())];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

impl Preprocessor for PdfPreprocessor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>> {
        if !looks_like_pdf(bytes) {
            return Err(crate::error::ExtractError::InvalidInput(
                "input is not a PDF document (missing %PDF- header)".to_string(),
            )
            .into());
        }

        let texts = self.backend.extract_page_texts(bytes)?;
        log::debug!("{} extracted {} pages", self.backend.name(), texts.len());

        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| PageText {
                page_number: index as u32 + 1,
                text: Some(text).filter(|t| !t.trim().is_empty()),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "PdfPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, &["pdf"])
    }
}
