use crate::error::{ExtractError, ExtractResult};
use regex::{Regex, RegexBuilder};

/// Marker phrase that opens the target table.
pub const DEFAULT_HEADER_MARKER: &str = "Weekly Terminal Transactions";

/// Split page text into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

// HeaderLocator - finds the line carrying the section header marker.
// Matching is case-insensitive and internal whitespace runs in the marker are
// not significant, so "WEEKLY   terminal Transactions" still matches.
#[derive(Debug, Clone)]
pub struct HeaderLocator {
    pattern: Regex,
}

impl HeaderLocator {
    pub fn new(marker: &str) -> ExtractResult<Self> {
        let words: Vec<String> = marker.split_whitespace().map(regex::escape).collect();
        if words.is_empty() {
            return Err(ExtractError::InvalidInput("header marker is empty".to_string()));
        }
        let pattern = RegexBuilder::new(&words.join(r"\s+"))
            .case_insensitive(true)
            .build()?;
        Ok(Self { pattern })
    }

    pub fn is_header(&self, line: &str) -> bool {
        self.pattern.is_match(line.trim())
    }

    /// Index of the first line after the header within `lines`.
    pub fn locate_in_lines(&self, lines: &[&str]) -> Option<usize> {
        lines
            .iter()
            .position(|line| self.is_header(line))
            .map(|index| index + 1)
    }

    /// Scan page text. Returns the index (into [`split_lines`] output) of the
    /// first line to hand to the row extractor, or `None` if no header.
    pub fn locate(&self, text: &str) -> Option<usize> {
        self.locate_in_lines(&split_lines(text))
    }
}

impl Default for HeaderLocator {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_MARKER).expect("default header marker is a valid pattern")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_drops_blank_lines() {
        let lines = split_lines("  first  \n\n   \n\tsecond\r\nthird");
        assert_eq!(lines, vec!["first", "second", "third"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn header_match_is_case_and_whitespace_insensitive() {
        let locator = HeaderLocator::default();
        for line in [
            "Weekly Terminal Transactions",
            "weekly terminal transactions",
            "WEEKLY TERMINAL TRANSACTIONS",
            "Weekly   Terminal \t Transactions",
            "  wEeKlY terminal TRANSACTIONS (Lagos Region)  ",
            "Report: Weekly Terminal Transactions",
        ] {
            assert!(locator.is_header(line), "{line:?} should match");
        }
        assert!(!locator.is_header("Weekly Terminal Summary"));
        assert!(!locator.is_header("WeeklyTerminalTransactions"));
    }

    #[test]
    fn locate_returns_line_after_header() {
        let locator = HeaderLocator::default();
        let text = "Company Ltd\n\nWeekly Terminal Transactions\nS/N Terminal ID\n1 row";
        assert_eq!(locator.locate(text), Some(2));
        assert_eq!(split_lines(text)[2], "S/N Terminal ID");
    }

    #[test]
    fn locate_stops_at_first_match() {
        let locator = HeaderLocator::default();
        let text = "Weekly Terminal Transactions\nrow\nWeekly Terminal Transactions\nrow";
        assert_eq!(locator.locate(text), Some(1));
    }

    #[test]
    fn locate_without_header() {
        let locator = HeaderLocator::default();
        assert_eq!(locator.locate("nothing to see\nhere"), None);
        assert_eq!(locator.locate(""), None);
    }

    #[test]
    fn custom_marker_is_escaped() {
        let locator = HeaderLocator::new("Terminals (Active)").unwrap();
        assert!(locator.is_header("terminals   (active)"));
        assert!(!locator.is_header("Terminals Active"));
    }

    #[test]
    fn blank_marker_is_rejected() {
        assert!(matches!(
            HeaderLocator::new("   "),
            Err(ExtractError::InvalidInput(_))
        ));
    }
}
