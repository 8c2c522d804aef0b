// txreport Core Library
//
// Extracts the "Weekly Terminal Transactions" table from PDF report text.
// Pages flow through a pluggable page-text source into the section state
// machine, which returns records plus a header-found flag.

pub mod cache;
pub mod config;
pub mod error;
pub mod money;
pub mod preprocessors;
pub mod processor;
pub mod report;
pub mod rules;
pub mod storage;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{ExtractionConfig, RolloverPolicy};
pub use error::{ExtractError, ExtractResult};
pub use preprocessors::{PdfPreprocessor, Preprocessor, TextPreprocessor};
pub use processor::ReportProcessor;
pub use report::ResponseEnvelope;
pub use rules::extract_records;
pub use types::*;

// Re-export backends for direct use
#[cfg(feature = "pdf-extract-backend")]
pub use preprocessors::PdfExtractBackend;
