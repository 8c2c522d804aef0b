//! Document Preprocessors
//!
//! This module provides the page-text source for the extraction core.
//!
//! ## Architecture
//!
//! ```text
//! Document (PDF, text dump)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! Vec<PageText> (1-based, document order)
//!     ↓
//! [SectionExtractor]
//!     ↓
//! ExtractionResult
//! ```
//!
//! ## Available Preprocessors
//!
//! - `PdfPreprocessor` - PDF documents via a pluggable backend (pdf-extract by default)
//! - `TextPreprocessor` - form-feed separated text dumps

pub mod pdf;
pub mod text;
pub mod traits;

// Re-export main types
pub use pdf::{looks_like_pdf, PdfBackend, PdfBackendImpl, PdfPreprocessor};
pub use text::TextPreprocessor;
pub use traits::Preprocessor;

// Re-export backends
#[cfg(feature = "pdf-extract-backend")]
pub use pdf::PdfExtractBackend;
