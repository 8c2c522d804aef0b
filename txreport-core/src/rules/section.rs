// Section state machine - carries section state and the record accumulator
// across page boundaries.
//
// BeforeSection --header--> InSection --rollover / record cap--> Done
//
// Once the header is seen, every following line on the same page and on all
// later pages is a row candidate. Lines that fail the row grammar (footers,
// repeated headers, subtitles) are skipped and never end the section. Only a
// sequence-number rollover, the optional record cap or end of input do.

use super::grammar::RowGrammar;
use super::header::{split_lines, HeaderLocator};
use crate::config::{ExtractionConfig, RolloverPolicy};
use crate::error::{ExtractError, ExtractResult};
use crate::types::*;
use regex::Regex;
use std::collections::HashSet;

pub struct SectionExtractor {
    state: SectionState,
    locator: HeaderLocator,
    grammar: RowGrammar,
    footer: Regex,
    rollover: RolloverPolicy,
    max_records: Option<usize>,
    records: Vec<Record>,
    header_page: Option<u32>,
    termination: Option<Termination>,
    stats: ExtractionStats,
}

impl SectionExtractor {
    /// Fresh state and accumulator for one extraction run
    pub fn new(config: &ExtractionConfig) -> ExtractResult<Self> {
        config.validate()?;
        Self::with_grammar(config, RowGrammar::weekly_terminal_transactions())
    }

    pub fn with_grammar(config: &ExtractionConfig, grammar: RowGrammar) -> ExtractResult<Self> {
        Ok(Self {
            state: SectionState::BeforeSection,
            locator: HeaderLocator::new(&config.header_marker)?,
            grammar,
            footer: Regex::new(&config.footer_pattern)?,
            rollover: config.rollover.clone(),
            max_records: config.max_records,
            records: Vec::new(),
            header_page: None,
            termination: None,
            stats: ExtractionStats::default(),
        })
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_done(&self) -> bool {
        self.state == SectionState::Done
    }

    /// Feed the next page in document order.
    pub fn feed_page(&mut self, page: &PageText) {
        if self.is_done() {
            return;
        }

        self.stats.pages_scanned += 1;
        let lines = split_lines(page.as_str());

        match self.state {
            SectionState::BeforeSection => {
                if let Some(start) = self.locator.locate_in_lines(&lines) {
                    log::info!(
                        "Section header found on page {} (line {})",
                        page.page_number,
                        start - 1
                    );
                    self.state = SectionState::InSection;
                    self.header_page = Some(page.page_number);
                    self.scan_lines(page.page_number, &lines, start);
                }
            }
            SectionState::InSection => self.scan_lines(page.page_number, &lines, 0),
            SectionState::Done => {}
        }
    }

    fn scan_lines(&mut self, page_number: u32, lines: &[&str], start: usize) {
        for (line_index, line) in lines.iter().enumerate().skip(start) {
            self.stats.lines_scanned += 1;

            let Some(row) = self.grammar.match_line(line) else {
                self.stats.lines_skipped += 1;
                if self.footer.is_match(line) {
                    self.stats.footer_lines += 1;
                }
                log::trace!("page {page_number} line {line_index}: not a row: {line:?}");
                continue;
            };

            let record = match row.to_record(page_number) {
                Ok(record) => record,
                Err(e) => {
                    // Shape matched but a value overflowed; same as a malformed line.
                    log::warn!("page {page_number} line {line_index}: skipping row: {e}");
                    self.stats.lines_skipped += 1;
                    continue;
                }
            };
            self.stats.rows_matched += 1;

            if self
                .rollover
                .is_rollover(record.sequence_number, self.records.len())
            {
                log::info!(
                    "Sequence rollover to {} on page {page_number} after {} records; section ends",
                    record.sequence_number,
                    self.records.len()
                );
                self.terminate(Termination::SequenceRollover {
                    page_number,
                    line_index,
                    sequence_number: record.sequence_number,
                });
                return;
            }

            self.records.push(record);

            if let Some(limit) = self.max_records {
                if self.records.len() >= limit {
                    log::info!("Record limit {limit} reached on page {page_number}");
                    self.terminate(Termination::RecordLimit { limit });
                    return;
                }
            }
        }
    }

    fn terminate(&mut self, termination: Termination) {
        self.state = SectionState::Done;
        self.termination = Some(termination);
    }

    pub fn finish(self) -> ExtractionResult {
        let header_found = self.header_page.is_some();
        let termination = self.termination.unwrap_or(if header_found {
            Termination::EndOfDocument
        } else {
            Termination::HeaderNotFound
        });

        log::debug!(
            "Extraction finished: {} records, {:?}, {:?}",
            self.records.len(),
            termination,
            self.stats
        );

        ExtractionResult {
            records: self.records,
            header_found,
            header_page: self.header_page,
            termination,
            stats: self.stats,
        }
    }
}

/// Run one extraction over a document's pages, in the order given.
///
/// # Errors
///
/// Fails fast with [`ExtractError`] when the page list is empty, a page
/// number is 0, or a page is supplied twice. A missing header or unmatched
/// lines are not errors.
pub fn extract_records<'a, I>(pages: I, config: &ExtractionConfig) -> ExtractResult<ExtractionResult>
where
    I: IntoIterator<Item = &'a PageText>,
{
    let mut extractor = SectionExtractor::new(config)?;
    let mut seen = HashSet::new();

    for page in pages {
        if page.page_number == 0 {
            return Err(ExtractError::InvalidPageNumber(page.page_number));
        }
        if !seen.insert(page.page_number) {
            return Err(ExtractError::DuplicatePage(page.page_number));
        }
        extractor.feed_page(page);
    }

    if seen.is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    Ok(extractor.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(seq: u64, serial: &str) -> String {
        format!("{seq} T{seq:03} {serial} Acme Stores Ltd 1,{seq:03}.50 4 0.00 0 5,000.00 True {seq}")
    }

    fn serials(result: &ExtractionResult) -> Vec<&str> {
        result
            .records
            .iter()
            .map(|r| r.terminal_serial.as_str())
            .collect()
    }

    #[test]
    fn state_transitions() {
        let mut extractor = SectionExtractor::new(&ExtractionConfig::default()).unwrap();
        assert_eq!(extractor.state(), SectionState::BeforeSection);

        extractor.feed_page(&PageText::new(1, "Cover page\nSummary"));
        assert_eq!(extractor.state(), SectionState::BeforeSection);

        extractor.feed_page(&PageText::new(
            2,
            format!("Weekly Terminal Transactions\n{}", row(1, "A")),
        ));
        assert_eq!(extractor.state(), SectionState::InSection);

        extractor.feed_page(&PageText::new(3, row(1, "B")));
        assert_eq!(extractor.state(), SectionState::Done);

        // Ignored once done
        extractor.feed_page(&PageText::new(4, row(2, "C")));
        let result = extractor.finish();
        assert_eq!(serials(&result), vec!["A"]);
        assert_eq!(result.stats.pages_scanned, 3);
    }

    #[test]
    fn lines_before_header_are_ignored() {
        let text = format!(
            "{}\nWeekly Terminal Transactions\n{}",
            row(5, "BEFORE"),
            row(1, "AFTER")
        );
        let result = extract_records(&[PageText::new(1, text)], &ExtractionConfig::default()).unwrap();
        assert_eq!(serials(&result), vec!["AFTER"]);
    }

    #[test]
    fn rollover_row_is_not_ingested() {
        let text = ["Weekly Terminal Transactions", &row(1, "A"), &row(2, "B"), &row(1, "X")].join("\n");
        let result = extract_records(&[PageText::new(1, text)], &ExtractionConfig::default()).unwrap();
        assert_eq!(serials(&result), vec!["A", "B"]);
        assert_eq!(
            result.termination,
            Termination::SequenceRollover {
                page_number: 1,
                line_index: 3,
                sequence_number: 1,
            }
        );
        assert_eq!(result.stats.rows_matched, 3);
    }

    #[test]
    fn disabled_rollover_scans_to_end() {
        let config = ExtractionConfig {
            rollover: RolloverPolicy::Disabled,
            ..ExtractionConfig::default()
        };
        let pages = vec![
            PageText::new(1, ["Weekly Terminal Transactions", &row(1, "A"), &row(2, "B")].join("\n")),
            PageText::new(2, [row(1, "C"), row(2, "D")].join("\n")),
        ];
        let result = extract_records(&pages, &config).unwrap();
        assert_eq!(serials(&result), vec!["A", "B", "C", "D"]);
        assert_eq!(result.termination, Termination::EndOfDocument);
    }

    #[test]
    fn record_limit_stops_extraction() {
        let config = ExtractionConfig {
            max_records: Some(2),
            ..ExtractionConfig::default()
        };
        let text = ["Weekly Terminal Transactions", &row(1, "A"), &row(2, "B"), &row(3, "C")].join("\n");
        let result = extract_records(&[PageText::new(1, text)], &config).unwrap();
        assert_eq!(serials(&result), vec!["A", "B"]);
        assert_eq!(result.termination, Termination::RecordLimit { limit: 2 });
    }

    #[test]
    fn footers_are_counted_and_skipped() {
        let pages = vec![
            PageText::new(
                1,
                ["Weekly Terminal Transactions", &row(1, "A"), "August 15, 2025 Page 1 of 2"].join("\n"),
            ),
            PageText::new(2, [row(2, "B"), "August 15, 2025 Page 2 of 2".to_string()].join("\n")),
        ];
        let result = extract_records(&pages, &ExtractionConfig::default()).unwrap();
        assert_eq!(serials(&result), vec!["A", "B"]);
        assert_eq!(result.stats.footer_lines, 2);
        assert_eq!(result.stats.lines_skipped, 2);
        assert_eq!(result.stats.lines_scanned, 4);
    }

    #[test]
    fn blank_pages_are_empty_text() {
        let pages = vec![
            PageText::blank(1),
            PageText::new(2, ["Weekly Terminal Transactions", &row(1, "A")].join("\n")),
            PageText::blank(3),
            PageText::new(4, row(2, "B")),
        ];
        let result = extract_records(&pages, &ExtractionConfig::default()).unwrap();
        assert_eq!(serials(&result), vec!["A", "B"]);
        assert_eq!(result.header_page, Some(2));
        assert_eq!(result.records[1].page_number, 4);
    }

    #[test]
    fn overflowing_values_are_skipped() {
        let huge = "1 T1 BIG Acme 1.00 1 0.00 0 1.00 True 99999999999999999999999";
        let text = ["Weekly Terminal Transactions", huge, &row(2, "OK")].join("\n");
        let result = extract_records(&[PageText::new(1, text)], &ExtractionConfig::default()).unwrap();
        assert_eq!(serials(&result), vec!["OK"]);
        assert_eq!(result.stats.lines_skipped, 1);
    }

    #[test]
    fn invalid_page_lists_fail_fast() {
        let config = ExtractionConfig::default();
        let none: Vec<PageText> = Vec::new();
        assert!(matches!(extract_records(&none, &config), Err(ExtractError::EmptyDocument)));

        let zero = vec![PageText::new(0, "text")];
        assert!(matches!(
            extract_records(&zero, &config),
            Err(ExtractError::InvalidPageNumber(0))
        ));

        let dup = vec![PageText::new(1, "a"), PageText::new(2, "b"), PageText::new(1, "c")];
        assert!(matches!(
            extract_records(&dup, &config),
            Err(ExtractError::DuplicatePage(1))
        ));
    }

    #[test]
    fn extractors_do_not_share_state() {
        let config = ExtractionConfig::default();
        let page = PageText::new(1, ["Weekly Terminal Transactions", &row(1, "A")].join("\n"));
        let first = extract_records(std::iter::once(&page), &config).unwrap();
        let second = extract_records(std::iter::once(&page), &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.count(), 1);
    }
}
