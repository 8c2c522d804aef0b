//! Plain-text page dumps.
//!
//! Pages are separated by form feed (`\x0C`), the same separator PDF text
//! extractors emit between pages. Useful for re-running extraction on text
//! saved from an earlier run and for tests.

use super::traits::{has_extension, Preprocessor};
use crate::types::PageText;
use anyhow::Result;
use std::path::Path;

pub const PAGE_SEPARATOR: u8 = 0x0C;

#[derive(Debug, Default, Clone, Copy)]
pub struct TextPreprocessor;

impl TextPreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Join page texts back into a form-feed separated dump
    pub fn join_pages(pages: &[PageText]) -> String {
        pages
            .iter()
            .map(PageText::as_str)
            .collect::<Vec<_>>()
            .join(&char::from(PAGE_SEPARATOR).to_string())
    }
}

impl Preprocessor for TextPreprocessor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>> {
        let mut chunks: Vec<&[u8]> = bytes.split(|b| *b == PAGE_SEPARATOR).collect();
        // A dump that ends with a separator has no page after it
        if chunks.len() > 1 && chunks.last().is_some_and(|c| c.is_empty()) {
            chunks.pop();
        }

        let mut pages = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.into_iter().enumerate() {
            pages.push(PageText::from_bytes(index as u32 + 1, chunk)?);
        }
        Ok(pages)
    }

    fn name(&self) -> &str {
        "TextPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, &["txt", "text"])
    }
}
