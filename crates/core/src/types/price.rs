//! Money helpers using decimal arithmetic.
//!
//! Amounts are kept as exact [`Decimal`] values in the store's single
//! currency (USD). Rounding happens only where a value leaves the core:
//! display strings and the tax line.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors that can occur when parsing a displayed price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The text contains no digits at all.
    #[error("price cannot be empty")]
    Empty,
    /// The text is not a decimal number.
    #[error("price is not a number: {0}")]
    NotANumber(String),
}

/// Round a monetary amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount for display (e.g., `$19.99`).
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

/// Parse a displayed price such as `"$12.50"` into an amount.
///
/// A leading currency symbol, surrounding whitespace and thousands
/// separators are accepted.
///
/// # Errors
///
/// Returns `PriceError` if the remaining text is empty or not a decimal
/// number (`"NaN"`, `"inf"` and friends are rejected).
pub fn parse_price_text(text: &str) -> Result<Decimal, PriceError> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(PriceError::Empty);
    }

    cleaned
        .parse::<Decimal>()
        .map_err(|_| PriceError::NotANumber(text.to_string()))
}
