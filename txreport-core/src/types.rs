use crate::error::{ExtractError, ExtractResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ===== INPUT CONTRACT =====
// One entry per page, in document order, as handed over by the page-text
// source. A page whose extraction yielded nothing carries `None`.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page_number: u32,
    pub text: Option<String>,
}

impl PageText {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: Some(text.into()),
        }
    }

    /// A page whose text extraction yielded nothing
    pub fn blank(page_number: u32) -> Self {
        Self {
            page_number,
            text: None,
        }
    }

    /// Decode raw page content, failing fast when it is not text
    pub fn from_bytes(page_number: u32, bytes: &[u8]) -> ExtractResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|source| ExtractError::NonTextPage {
                page_number,
                source,
            })?
            .to_string();
        Ok(Self::new(page_number, text))
    }

    /// Page text with `None` treated as empty
    pub fn as_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

// ===== OUTPUT CONTRACT =====

/// One terminal's weekly transaction summary.
///
/// Records are created once from a fully matched row and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// As printed on the source line, not renumbered
    pub sequence_number: u64,
    /// Business key; passed through exactly as captured
    pub terminal_serial: String,
    /// Grouping separators removed, scale 2, serialized as a string
    pub payment_value: Decimal,
    pub days_since_last_transaction: u64,
    /// Provenance only (1-indexed)
    pub page_number: u32,
}

/// Where the section state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionState {
    /// Still looking for the header marker
    BeforeSection,
    /// Header seen; every following line is a row candidate
    InSection,
    /// Terminated; further input is ignored
    Done,
}

/// Why extraction stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// The header marker never appeared
    HeaderNotFound,
    /// Input ran out without a rollover
    EndOfDocument,
    /// A row restarted the sequence numbering; it was not ingested
    SequenceRollover {
        page_number: u32,
        line_index: usize,
        sequence_number: u64,
    },
    /// The configured record cap was reached
    RecordLimit { limit: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub pages_scanned: usize,
    /// Lines examined as row candidates (after the header)
    pub lines_scanned: usize,
    pub rows_matched: usize,
    /// Candidate lines that failed the row grammar
    pub lines_skipped: usize,
    /// Skipped lines recognised as pagination footers
    pub footer_lines: usize,
}

/// Result of one extraction run over one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub records: Vec<Record>,
    pub header_found: bool,
    /// Page where the header marker was found
    pub header_page: Option<u32>,
    pub termination: Termination,
    pub stats: ExtractionStats,
}

impl ExtractionResult {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
