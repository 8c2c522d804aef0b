// Output shapes handed to consumers of an extraction run.
//
// The envelope keeps the field names of the upload service's JSON response so
// existing front ends keep working; `records` is the plain record array.

use crate::types::*;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeRow {
    #[serde(rename = "Terminal Serial")]
    pub terminal_serial: String,
    #[serde(rename = "Payment Value")]
    pub payment_value: Decimal,
    #[serde(rename = "Days Since Last Transaction")]
    pub days_since_last_transaction: u64,
}

impl From<&Record> for EnvelopeRow {
    fn from(record: &Record) -> Self {
        Self {
            terminal_serial: record.terminal_serial.clone(),
            payment_value: record.payment_value,
            days_since_last_transaction: record.days_since_last_transaction,
        }
    }
}

/// Response envelope. `page_number` is the page carrying the header, or null
/// when the header never appeared; `message` is only present in that case, so
/// "0 results found" stays distinguishable from "header matched, 0 rows".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub page_number: Option<u32>,
    pub count: usize,
    pub data: Vec<EnvelopeRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub header_found: bool,
    pub termination: Termination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatReport {
    pub format: String,
    /// One tab-separated `serial  payment  days` line per record
    pub lines: Vec<String>,
}

impl ExtractionResult {
    pub fn to_envelope(&self, header_marker: &str) -> ResponseEnvelope {
        ResponseEnvelope {
            page_number: self.header_page,
            count: self.records.len(),
            data: self.records.iter().map(EnvelopeRow::from).collect(),
            message: (!self.header_found)
                .then(|| format!("No page found with header starting '{header_marker}'.")),
            header_found: self.header_found,
            termination: self.termination.clone(),
        }
    }

    pub fn to_flat_format(&self) -> FlatReport {
        FlatReport {
            format: "flat".to_string(),
            lines: self
                .records
                .iter()
                .map(|r| {
                    format!(
                        "{}\t{}\t{}",
                        r.terminal_serial, r.payment_value, r.days_since_last_transaction
                    )
                })
                .collect(),
        }
    }

    /// Render in one of the output formats: `envelope` (default), `records`, `flat`
    pub fn render(&self, format: &str, header_marker: &str) -> Result<String> {
        let json = match format {
            "records" => serde_json::to_string_pretty(&self.records)?,
            "flat" => serde_json::to_string_pretty(&self.to_flat_format())?,
            _ => serde_json::to_string_pretty(&self.to_envelope(header_marker))?,
        };
        Ok(json)
    }

    pub fn save_with_format(&self, path: &str, format: &str, header_marker: &str) -> Result<()> {
        std::fs::write(path, self.render(format, header_marker)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn result_with(records: Vec<Record>, header_page: Option<u32>) -> ExtractionResult {
        ExtractionResult {
            header_found: header_page.is_some(),
            header_page,
            termination: if header_page.is_some() {
                Termination::EndOfDocument
            } else {
                Termination::HeaderNotFound
            },
            stats: ExtractionStats::default(),
            records,
        }
    }

    fn record() -> Record {
        Record {
            sequence_number: 1,
            terminal_serial: "SER123".to_string(),
            payment_value: Decimal::from_str("12345.67").unwrap(),
            days_since_last_transaction: 7,
            page_number: 1,
        }
    }

    #[test]
    fn record_serializes_money_as_string() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(
            value,
            json!({
                "sequenceNumber": 1,
                "terminalSerial": "SER123",
                "paymentValue": "12345.67",
                "daysSinceLastTransaction": 7,
                "pageNumber": 1
            })
        );
    }

    #[test]
    fn envelope_keeps_service_field_names() {
        let envelope = result_with(vec![record()], Some(3)).to_envelope("Weekly Terminal Transactions");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["page_number"], 3);
        assert_eq!(value["count"], 1);
        assert_eq!(value["data"][0]["Terminal Serial"], "SER123");
        assert_eq!(value["data"][0]["Payment Value"], "12345.67");
        assert_eq!(value["data"][0]["Days Since Last Transaction"], 7);
        assert!(value.get("message").is_none());
        assert_eq!(value["termination"]["reason"], "end_of_document");
    }

    #[test]
    fn envelope_without_header_has_message() {
        let envelope = result_with(vec![], None).to_envelope("Weekly Terminal Transactions");
        assert_eq!(envelope.page_number, None);
        assert_eq!(envelope.count, 0);
        assert_eq!(
            envelope.message.as_deref(),
            Some("No page found with header starting 'Weekly Terminal Transactions'.")
        );
    }

    #[test]
    fn header_found_with_no_rows_is_distinct() {
        let envelope = result_with(vec![], Some(1)).to_envelope("Weekly Terminal Transactions");
        assert_eq!(envelope.count, 0);
        assert!(envelope.header_found);
        assert!(envelope.message.is_none());
    }

    #[test]
    fn render_formats() {
        let result = result_with(vec![record()], Some(1));
        let records: serde_json::Value =
            serde_json::from_str(&result.render("records", "x").unwrap()).unwrap();
        assert_eq!(records[0]["terminalSerial"], "SER123");

        let flat: serde_json::Value =
            serde_json::from_str(&result.render("flat", "x").unwrap()).unwrap();
        assert_eq!(flat["lines"][0], "SER123\t12345.67\t7");

        // Unknown formats fall back to the envelope
        let envelope: serde_json::Value =
            serde_json::from_str(&result.render("nope", "x").unwrap()).unwrap();
        assert_eq!(envelope["count"], 1);
    }
}
