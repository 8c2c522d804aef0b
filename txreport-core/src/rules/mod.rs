// Main rules module - the extraction core.
// - header.rs: Section locator (header marker detection, line splitting)
// - grammar.rs: Row grammar built from typed token matchers
// - section.rs: Cross-page section state machine and the extraction entry point

pub mod grammar;
pub mod header;
pub mod section;

pub use grammar::{FieldMatcher, FieldSpec, RowGrammar, RowMatch};
pub use header::{split_lines, HeaderLocator, DEFAULT_HEADER_MARKER};
pub use section::{extract_records, SectionExtractor};
