//! Micro-unit money and quantity arithmetic.
//!
//! Prices, cash, notionals, and share quantities are all `i64` at 1e-6
//! scale. Decimal text crosses into micros through [`parse_micros`]
//! (no floating point at any stage) and back out through
//! [`format_micros`]. Products and quotients go through `i128`
//! intermediates and clamp at the `i64` range.

use std::fmt;

/// 1 unit (1 USD, 1 share) = 1_000_000 micros.
pub const MICROS_SCALE: i64 = 1_000_000;

/// Errors from decimal-text parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseMoneyError {
    Empty,
    Invalid(String),
    /// More than 6 decimal places would require rounding; rejected so
    /// the micro conversion stays exact.
    TooManyDecimalPlaces(String),
}

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMoneyError::Empty => write!(f, "empty decimal value"),
            ParseMoneyError::Invalid(raw) => write!(f, "invalid decimal value: '{raw}'"),
            ParseMoneyError::TooManyDecimalPlaces(raw) => {
                write!(f, "more than 6 decimal places: '{raw}'")
            }
        }
    }
}

impl std::error::Error for ParseMoneyError {}

/// Convert decimal text to integer micros deterministically.
///
/// Accepts an optional sign and an optional fractional part of up to
/// six digits. Never rounds: seven or more fractional digits are an
/// error rather than a silent truncation.
pub fn parse_micros(s: &str) -> Result<i64, ParseMoneyError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseMoneyError::Empty);
    }

    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    let all_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ParseMoneyError::Invalid(s.to_string()));
    }
    if (!int_part.is_empty() && !all_digits(int_part))
        || (!frac_part.is_empty() && !all_digits(frac_part))
    {
        return Err(ParseMoneyError::Invalid(s.to_string()));
    }
    if frac_part.len() > 6 {
        return Err(ParseMoneyError::TooManyDecimalPlaces(s.to_string()));
    }

    let int_val: i64 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse::<i64>()
            .map_err(|_| ParseMoneyError::Invalid(s.to_string()))?
    };

    let mut frac_padded = frac_part.to_string();
    while frac_padded.len() < 6 {
        frac_padded.push('0');
    }
    let frac_val: i64 = if frac_padded.is_empty() {
        0
    } else {
        frac_padded
            .parse::<i64>()
            .map_err(|_| ParseMoneyError::Invalid(s.to_string()))?
    };

    let micros = int_val
        .checked_mul(MICROS_SCALE)
        .and_then(|v| v.checked_add(frac_val))
        .ok_or_else(|| ParseMoneyError::Invalid(s.to_string()))?;

    Ok(if negative { -micros } else { micros })
}

/// Format micros as a 6-decimal string (`1_500_000` -> `"1.500000"`).
pub fn format_micros(micros: i64) -> String {
    let units = micros / MICROS_SCALE;
    let frac = (micros % MICROS_SCALE).abs();
    // When |value| < 1 and negative, the integer part truncates to 0
    // and loses the sign; emit it explicitly.
    if micros < 0 && units == 0 {
        format!("-{units}.{frac:06}")
    } else {
        format!("{units}.{frac:06}")
    }
}

fn clamp_i128(x: i128) -> i64 {
    if x > i64::MAX as i128 {
        i64::MAX
    } else if x < i64::MIN as i128 {
        i64::MIN
    } else {
        x as i64
    }
}

/// `price × qty` at micro scale: both inputs are micros, the product
/// is rescaled back to micros.
pub fn notional_micros(price_micros: i64, qty_micros: i64) -> i64 {
    clamp_i128((price_micros as i128) * (qty_micros as i128) / (MICROS_SCALE as i128))
}

/// Derive a micro-share quantity from a cash notional and a price.
/// `None` when the price is non-positive.
pub fn qty_from_notional(notional_micros: i64, price_micros: i64) -> Option<i64> {
    if price_micros <= 0 {
        return None;
    }
    Some(clamp_i128(
        (notional_micros as i128) * (MICROS_SCALE as i128) / (price_micros as i128),
    ))
}
