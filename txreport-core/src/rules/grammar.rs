// Row grammar - an ordered sequence of typed token matchers composed left to right.
//
// A line is a row only if every field matches in order, separated by runs of
// whitespace, with the last field anchored to end-of-line. Free text is the
// only field that can span whitespace; it is tried shortest-first so the
// monetary field that follows it binds as early as possible.

use crate::error::ExtractResult;
use crate::money::{is_grouped_decimal, parse_amount, parse_count};
use crate::types::Record;

pub const SEQUENCE_NUMBER: &str = "sequence_number";
pub const TERMINAL_ID: &str = "terminal_id";
pub const TERMINAL_SERIAL: &str = "terminal_serial";
pub const BUSINESS_NAME: &str = "business_name";
pub const PAYMENT_VALUE: &str = "payment_value";
pub const PAYMENT_VOLUME: &str = "payment_volume";
pub const TRANSFER_VALUE: &str = "transfer_value";
pub const TRANSFER_VOLUME: &str = "transfer_volume";
pub const TARGET_PAYMENT_VALUE: &str = "target_payment_value";
pub const TARGET_MET: &str = "target_met";
pub const DAYS_SINCE_LAST_TRANSACTION: &str = "days_since_last_transaction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatcher {
    /// One or more ASCII digits
    Integer,
    /// One or more non-whitespace characters
    Token,
    /// Any characters, possibly empty, possibly containing whitespace
    FreeText,
    /// Digits with optional grouping commas, a point, exactly two digits
    Decimal,
    /// A grouped decimal or the literal `0.00`
    DecimalOrZero,
    /// One of a fixed set of case-sensitive literals
    OneOf(&'static [&'static str]),
}

impl FieldMatcher {
    /// Check a whitespace-delimited token against this matcher.
    /// `FreeText` is not token-shaped and never matches here.
    pub fn accepts(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        match self {
            FieldMatcher::Integer => token.bytes().all(|b| b.is_ascii_digit()),
            FieldMatcher::Token => !token.chars().any(char::is_whitespace),
            FieldMatcher::FreeText => false,
            FieldMatcher::Decimal => is_grouped_decimal(token),
            FieldMatcher::DecimalOrZero => token == "0.00" || is_grouped_decimal(token),
            FieldMatcher::OneOf(options) => options.contains(&token),
        }
    }

    pub fn is_free_text(&self) -> bool {
        matches!(self, FieldMatcher::FreeText)
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub matcher: FieldMatcher,
    /// Whether the matched text is kept in the [`RowMatch`]
    pub capture: bool,
}

impl FieldSpec {
    pub const fn kept(name: &'static str, matcher: FieldMatcher) -> Self {
        Self {
            name,
            matcher,
            capture: true,
        }
    }

    pub const fn discarded(name: &'static str, matcher: FieldMatcher) -> Self {
        Self {
            name,
            matcher,
            capture: false,
        }
    }
}

/// Captured fields of a fully matched row, borrowed from the source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMatch<'a> {
    captures: Vec<(&'static str, &'a str)>,
}

impl<'a> RowMatch<'a> {
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.captures
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }

    pub fn captures(&self) -> &[(&'static str, &'a str)] {
        &self.captures
    }

    /// Parsed sequence number, used for section-boundary decisions before
    /// the row is turned into a record.
    pub fn sequence_number(&self) -> Option<u64> {
        self.get(SEQUENCE_NUMBER)
            .and_then(|raw| parse_count(raw).ok())
    }

    /// Normalize the captures into a [`Record`].
    pub fn to_record(&self, page_number: u32) -> ExtractResult<Record> {
        let field = |name: &str| self.get(name).unwrap_or_default();

        Ok(Record {
            sequence_number: parse_count(field(SEQUENCE_NUMBER))?,
            terminal_serial: field(TERMINAL_SERIAL).to_string(),
            payment_value: parse_amount(field(PAYMENT_VALUE))?,
            days_since_last_transaction: parse_count(field(DAYS_SINCE_LAST_TRANSACTION))?,
            page_number,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RowGrammar {
    fields: Vec<FieldSpec>,
}

impl RowGrammar {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The row layout of the "Weekly Terminal Transactions" table:
    ///
    /// `S/N  TerminalID  Serial  Business Name...  Payment  Vol  Transfer  Vol  Target  Met  Days`
    pub fn weekly_terminal_transactions() -> Self {
        use FieldMatcher::*;

        Self::new(vec![
            FieldSpec::kept(SEQUENCE_NUMBER, Integer),
            FieldSpec::discarded(TERMINAL_ID, Token),
            FieldSpec::kept(TERMINAL_SERIAL, Token),
            FieldSpec::discarded(BUSINESS_NAME, FreeText),
            FieldSpec::kept(PAYMENT_VALUE, Decimal),
            FieldSpec::discarded(PAYMENT_VOLUME, Integer),
            FieldSpec::discarded(TRANSFER_VALUE, DecimalOrZero),
            FieldSpec::discarded(TRANSFER_VOLUME, Integer),
            FieldSpec::discarded(TARGET_PAYMENT_VALUE, Decimal),
            FieldSpec::discarded(TARGET_MET, OneOf(&["True", "False"])),
            FieldSpec::kept(DAYS_SINCE_LAST_TRANSACTION, Integer),
        ])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Match a whole line. Partial matches produce nothing.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<RowMatch<'a>> {
        let line = line.trim();
        if self.fields.is_empty() || line.is_empty() {
            return None;
        }

        let mut captures = Vec::new();
        if self.match_from(line, 0, 0, &mut captures) {
            Some(RowMatch { captures })
        } else {
            None
        }
    }

    pub fn is_row(&self, line: &str) -> bool {
        self.match_line(line).is_some()
    }

    fn match_from<'a>(
        &self,
        line: &'a str,
        field_index: usize,
        pos: usize,
        captures: &mut Vec<(&'static str, &'a str)>,
    ) -> bool {
        let Some(spec) = self.fields.get(field_index) else {
            return line[pos..].trim().is_empty();
        };
        let is_last = field_index + 1 == self.fields.len();

        if spec.matcher.is_free_text() {
            if is_last {
                push_capture(captures, spec, &line[pos..]);
                return true;
            }

            // Shortest first; the next field starts right where the text stops.
            let candidates = line[pos..]
                .char_indices()
                .map(|(offset, _)| pos + offset)
                .chain(std::iter::once(line.len()));
            for end in candidates {
                let mark = captures.len();
                push_capture(captures, spec, &line[pos..end]);
                if self.match_from(line, field_index + 1, end, captures) {
                    return true;
                }
                captures.truncate(mark);
            }
            return false;
        }

        let rest = &line[pos..];
        let token_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..token_len];
        if !spec.matcher.accepts(token) {
            return false;
        }

        let after = &rest[token_len..];
        let gap = after.len() - after.trim_start().len();
        if is_last {
            if !after.trim().is_empty() {
                return false;
            }
        } else if gap == 0 {
            return false;
        }

        let mark = captures.len();
        push_capture(captures, spec, token);
        if self.match_from(line, field_index + 1, pos + token_len + gap, captures) {
            return true;
        }
        captures.truncate(mark);
        false
    }
}

impl Default for RowGrammar {
    fn default() -> Self {
        Self::weekly_terminal_transactions()
    }
}

fn push_capture<'a>(captures: &mut Vec<(&'static str, &'a str)>, spec: &FieldSpec, text: &'a str) {
    if spec.capture {
        captures.push((spec.name, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "1 T001 SER123 Acme Corp 12,345.67 10 0.00 0 5,000.00 True 7";

    #[test]
    fn integer_matcher() {
        assert!(FieldMatcher::Integer.accepts("0042"));
        assert!(!FieldMatcher::Integer.accepts("42a"));
        assert!(!FieldMatcher::Integer.accepts(""));
    }

    #[test]
    fn decimal_matchers() {
        assert!(FieldMatcher::Decimal.accepts("12,345.67"));
        assert!(FieldMatcher::Decimal.accepts("0.00"));
        assert!(!FieldMatcher::Decimal.accepts("12345.6"));
        assert!(!FieldMatcher::Decimal.accepts("12,345"));
        assert!(FieldMatcher::DecimalOrZero.accepts("0.00"));
        assert!(FieldMatcher::DecimalOrZero.accepts("1,000.00"));
        assert!(!FieldMatcher::DecimalOrZero.accepts("-"));
    }

    #[test]
    fn literal_matcher_is_case_sensitive() {
        let met = FieldMatcher::OneOf(&["True", "False"]);
        assert!(met.accepts("True"));
        assert!(met.accepts("False"));
        assert!(!met.accepts("true"));
        assert!(!met.accepts("FALSE"));
    }

    #[test]
    fn matches_full_row() {
        let grammar = RowGrammar::weekly_terminal_transactions();
        let row = grammar.match_line(ROW).expect("row should match");
        assert_eq!(row.get(SEQUENCE_NUMBER), Some("1"));
        assert_eq!(row.get(TERMINAL_SERIAL), Some("SER123"));
        assert_eq!(row.get(PAYMENT_VALUE), Some("12,345.67"));
        assert_eq!(row.get(DAYS_SINCE_LAST_TRANSACTION), Some("7"));
        // Discarded fields are not captured
        assert_eq!(row.get(TERMINAL_ID), None);
        assert_eq!(row.get(BUSINESS_NAME), None);
    }

    #[test]
    fn weekly_layout_keeps_four_fields() {
        let grammar = RowGrammar::weekly_terminal_transactions();
        assert_eq!(grammar.fields().len(), 11);
        assert!(grammar.fields()[3].matcher.is_free_text());

        let row = grammar.match_line(ROW).unwrap();
        assert_eq!(
            row.captures(),
            &[
                (SEQUENCE_NUMBER, "1"),
                (TERMINAL_SERIAL, "SER123"),
                (PAYMENT_VALUE, "12,345.67"),
                (DAYS_SINCE_LAST_TRANSACTION, "7"),
            ]
        );
    }

    #[test]
    fn converts_to_record() {
        let grammar = RowGrammar::default();
        let record = grammar.match_line(ROW).unwrap().to_record(1).unwrap();
        assert_eq!(record.sequence_number, 1);
        assert_eq!(record.terminal_serial, "SER123");
        assert_eq!(record.payment_value.to_string(), "12345.67");
        assert_eq!(record.days_since_last_transaction, 7);
        assert_eq!(record.page_number, 1);
    }

    #[test]
    fn business_name_may_contain_numbers_and_spaces() {
        let grammar = RowGrammar::default();
        let line = "12 T9 SN-77/a Shop 24 Seven Ltd. 3 1,500.25 4 2,000.00 9 10,000.00 False 0";
        let row = grammar.match_line(line).expect("row should match");
        assert_eq!(row.get(TERMINAL_SERIAL), Some("SN-77/a"));
        assert_eq!(row.get(PAYMENT_VALUE), Some("1,500.25"));
        assert_eq!(row.get(DAYS_SINCE_LAST_TRANSACTION), Some("0"));
    }

    #[test]
    fn business_name_may_be_empty() {
        let grammar = RowGrammar::default();
        let line = "3 T3 S3 100.00 1 0.00 0 200.00 False 12";
        let row = grammar.match_line(line).expect("row should match");
        assert_eq!(row.get(PAYMENT_VALUE), Some("100.00"));
    }

    #[test]
    fn transfer_value_zero_or_grouped() {
        let grammar = RowGrammar::default();
        let zero = "5 T5 S5 Foo 1,234.56 3 0.00 0 1,000.00 True 2";
        let grouped = "5 T5 S5 Foo 1,234.56 3 9,876.54 8 1,000.00 True 2";
        for line in [zero, grouped] {
            let row = grammar.match_line(line).expect("row should match");
            assert_eq!(row.get(PAYMENT_VALUE), Some("1,234.56"));
            assert_eq!(row.get(TRANSFER_VALUE), None);
        }
    }

    #[test]
    fn tolerates_variable_whitespace() {
        let grammar = RowGrammar::default();
        let line = "  7\tT7   S7  Big   Store   9.99  1  0.00  0  10.00  True   3   ";
        let row = grammar.match_line(line).expect("row should match");
        assert_eq!(row.get(TERMINAL_SERIAL), Some("S7"));
        assert_eq!(row.get(PAYMENT_VALUE), Some("9.99"));
        assert_eq!(row.get(DAYS_SINCE_LAST_TRANSACTION), Some("3"));
    }

    #[test]
    fn rejects_partial_rows() {
        let grammar = RowGrammar::default();
        let rejected = [
            "August 15, 2025 Page 2 of 2",
            "S/N Terminal ID Terminal Serial Business Name Payment Value",
            // Missing target payment value
            "1 T001 SER123 Acme 12,345.67 10 0.00 0 True 7",
            // Lowercase flag
            "1 T001 SER123 Acme 12,345.67 10 0.00 0 5,000.00 true 7",
            // Trailing junk after days
            "1 T001 SER123 Acme 12,345.67 10 0.00 0 5,000.00 True 7 extra",
            // Comma-only transfer value
            "1 T001 SER123 Acme 12,345.67 10 ,.00 0 5,000.00 True 7",
            // Non-numeric sequence number
            "A T001 SER123 Acme 12,345.67 10 0.00 0 5,000.00 True 7",
            "",
        ];
        for line in rejected {
            assert!(!grammar.is_row(line), "{line:?} should not be a row");
        }
    }
}
