//! Error taxonomy for the extraction core.
//!
//! Only structurally invalid input is an error here. A missing header or a
//! line that fails the row grammar are ordinary outcomes and surface as
//! empty or partial results, never as an `Err`.

use std::str::Utf8Error;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Generic invalid input with a descriptive reason.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The page source produced no pages at all.
    #[error("invalid input: document has no pages")]
    EmptyDocument,

    /// Page numbers are 1-based.
    #[error("invalid input: page number {0} is not 1-based")]
    InvalidPageNumber(u32),

    /// Each page must be supplied exactly once.
    #[error("invalid input: page {0} supplied more than once")]
    DuplicatePage(u32),

    /// Page content could not be decoded as text.
    #[error("invalid input: page {page_number} is not valid UTF-8 text")]
    NonTextPage {
        page_number: u32,
        #[source]
        source: Utf8Error,
    },

    /// A monetary capture did not have the grouped `1,234.56` shape.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    /// An integer capture did not parse.
    #[error("invalid count: {0:?}")]
    InvalidCount(String),

    /// A configured pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The page-text backend failed.
    #[error("page text extraction failed: {0}")]
    Backend(String),
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
