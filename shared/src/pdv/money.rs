//! Money helpers backed by `rust_decimal`
//!
//! Amounts travel as `f64` (JSON / DOUBLE PRECISION) and are converted to
//! `Decimal` for every calculation, then rounded back to 2 decimal places
//! half away from zero.

use rust_decimal::prelude::*;

use crate::error::{AppError, ErrorCode};

const DECIMAL_PLACES: u32 = 2;

/// Maximum quantity of a single cart line
pub const MAX_QUANTITY: i32 = 9999;
/// Maximum note length (characters)
pub const MAX_NOTE_LEN: usize = 200;
/// Maximum accepted monetary amount (R$ 1.000.000)
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Convert f64 to Decimal; non-finite input becomes zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round to 2 decimal places, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Amount must be finite, non-negative and at most [`MAX_AMOUNT`]
pub fn validate_amount(value: f64, field: &'static str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 || value > MAX_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("{field} must be between 0 and {MAX_AMOUNT}, got {value}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Quantity must be in `1..=MAX_QUANTITY`
pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("quantity must be between 1 and {MAX_QUANTITY}, got {quantity}"),
        )
        .with_detail("field", "quantity"));
    }
    Ok(())
}

/// Trim a note; empty becomes `None`, over-long is rejected
pub fn normalize_note(note: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(AppError::with_message(
            ErrorCode::NoteTooLong,
            format!("note must be at most {MAX_NOTE_LEN} characters"),
        )
        .with_detail("field", "note"));
    }
    Ok(Some(note.to_string()))
}
