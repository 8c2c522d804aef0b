//! Pure-Rust backend built on the `pdf-extract` crate.
//!
//! `pdf-extract` can panic on malformed documents instead of returning an
//! error, so every call runs inside [`std::panic::catch_unwind`] and a panic
//! becomes an [`ExtractError::Backend`].

use super::PdfBackend;
use crate::error::ExtractError;
use anyhow::Result;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for PdfExtractBackend {
    fn extract_page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            ::pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        }));

        let pages = match result {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                return Err(ExtractError::Backend(format!("failed to extract text from PDF: {e}")).into())
            }
            Err(_) => {
                return Err(ExtractError::Backend(
                    "PDF extraction panicked (malformed document)".to_string(),
                )
                .into())
            }
        };

        log::debug!("pdf-extract returned {} pages", pages.len());
        Ok(pages)
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn is_healthy(&self) -> bool {
        true
    }
}
