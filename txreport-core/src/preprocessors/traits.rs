// Preprocessor abstraction - the page-text source collaborator.
//
// This module defines the boundary between document decoding (PDF -> page text)
// and record extraction (page text -> records). Everything after this point
// works with PageText and is format-agnostic.

use crate::types::PageText;
use anyhow::Result;
use std::path::Path;

/// Preprocessor trait - converts documents to ordered page texts
///
/// Implementations must hand back every page exactly once, in document
/// order, numbered from 1. A page whose text extraction yields nothing is
/// still present, with `text: None` or empty text.
pub trait Preprocessor {
    /// Convert raw document bytes to page texts
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>>;

    /// Convenience method: Process from file path
    fn process_file(&self, input: &Path) -> Result<Vec<PageText>> {
        let bytes = std::fs::read(input)?;
        self.extract_pages(&bytes)
    }

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Case-insensitive extension check shared by the preprocessors
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
