//! Field normalization for captured monetary and integer values.
//!
//! Payment values are printed with thousands separators and exactly two
//! fractional digits (`12,345.67`). They are held as [`Decimal`] with a
//! scale of 2 and never pass through binary floating point.

use crate::error::{ExtractError, ExtractResult};
use rust_decimal::Decimal;

/// Number of fractional digits every amount carries.
pub const AMOUNT_SCALE: u32 = 2;

/// Returns true if `s` has the grouped decimal shape `[\d,]+\.\d{2}`.
///
/// At least one digit is required before the decimal point.
pub fn is_grouped_decimal(s: &str) -> bool {
    let Some((int_part, frac_part)) = s.split_once('.') else {
        return false;
    };

    !int_part.is_empty()
        && int_part.chars().all(|c| c.is_ascii_digit() || c == ',')
        && int_part.chars().any(|c| c.is_ascii_digit())
        && frac_part.len() == AMOUNT_SCALE as usize
        && frac_part.chars().all(|c| c.is_ascii_digit())
}

/// Parses a grouped decimal into a fixed-point [`Decimal`] with scale 2.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidAmount`] if the input is not a grouped
/// decimal or does not fit in a [`Decimal`].
pub fn parse_amount(raw: &str) -> ExtractResult<Decimal> {
    let trimmed = raw.trim();
    if !is_grouped_decimal(trimmed) {
        return Err(ExtractError::InvalidAmount(raw.to_string()));
    }

    let ungrouped: String = trimmed.chars().filter(|c| *c != ',').collect();
    let mut value = Decimal::from_str_exact(&ungrouped)
        .map_err(|_| ExtractError::InvalidAmount(raw.to_string()))?;
    value.rescale(AMOUNT_SCALE);
    Ok(value)
}

/// Strips grouping separators and returns the canonical string form
/// (`"12,345.67"` becomes `"12345.67"`).
///
/// Normalizing an already normalized value returns it unchanged.
pub fn normalize_amount(raw: &str) -> ExtractResult<String> {
    parse_amount(raw).map(|value| value.to_string())
}

/// Parses an integer capture. Leading zeros are dropped by integer parsing.
pub fn parse_count(raw: &str) -> ExtractResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ExtractError::InvalidCount(raw.to_string()))
}
