use crate::error::{ExtractError, ExtractResult};
use crate::rules::header::DEFAULT_HEADER_MARKER;
use anyhow::Result;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_header_marker() -> String {
    DEFAULT_HEADER_MARKER.to_string()
}

fn default_footer_pattern() -> String {
    // "August 15, 2025 Page 36 of 59"
    r"(?i)Page\s+\d+\s+of\s+\d+".to_string()
}

fn default_max_input_bytes() -> u64 {
    15 * 1024 * 1024 // 15 MB upload limit
}

/// How the section state machine decides that a new table has begun.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RolloverPolicy {
    /// A row whose sequence number equals `value`, after at least one row was
    /// accepted, ends the section and is not ingested.
    RestartAt { value: u64 },
    /// Never terminate on sequence numbers; scan to end of document.
    /// For reports that restart numbering on every page.
    Disabled,
}

impl Default for RolloverPolicy {
    fn default() -> Self {
        RolloverPolicy::RestartAt { value: 1 }
    }
}

impl RolloverPolicy {
    /// Whether a row with `sequence_number` ends the section, given how many
    /// rows were already accepted in this run.
    pub fn is_rollover(&self, sequence_number: u64, accepted: usize) -> bool {
        match self {
            RolloverPolicy::RestartAt { value } => accepted > 0 && sequence_number == *value,
            RolloverPolicy::Disabled => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Phrase that opens the target table (case-insensitive, whitespace-flexible)
    #[serde(default = "default_header_marker")]
    pub header_marker: String,
    /// Section termination rule
    #[serde(default)]
    pub rollover: RolloverPolicy,
    /// Stop after this many records (no cap when absent)
    #[serde(default)]
    pub max_records: Option<usize>,
    /// Regex recognising pagination footers; only used for statistics
    #[serde(default = "default_footer_pattern")]
    pub footer_pattern: String,
    /// Reject inputs larger than this before extraction
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
    /// Write a JSON run log for every processed document
    #[serde(default)]
    pub write_run_log: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            header_marker: default_header_marker(),
            rollover: RolloverPolicy::default(),
            max_records: None,
            footer_pattern: default_footer_pattern(),
            max_input_bytes: default_max_input_bytes(),
            write_run_log: false,
        }
    }
}

impl ExtractionConfig {
    /// Load config from file path (functional approach)
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ExtractionConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                eprintln!("⚠️  Failed to load config from {p} ({e}), using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> ExtractResult<()> {
        if self.header_marker.trim().is_empty() {
            return Err(ExtractError::InvalidInput(
                "header_marker must not be empty".to_string(),
            ));
        }
        if self.max_records == Some(0) {
            return Err(ExtractError::InvalidInput(
                "max_records must be at least 1 when set".to_string(),
            ));
        }
        regex::Regex::new(&self.footer_pattern)?;
        Ok(())
    }
}
