// Precision-aware formatting for order quantities and prices.
// Values are always truncated, never rounded up.

use crate::error::{BotError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Largest scale `Decimal` can hold.
const MAX_SCALE: u32 = 28;

/// Format `value` with the given exchange precision, truncating toward zero.
///
/// * `precision >= 0`: exactly `precision` fractional digits, trailing zeros kept.
/// * `precision < 0`: floor to a multiple of `10^|precision|`, printed as an integer.
pub fn format_decimal(value: Decimal, precision: i32) -> String {
    if precision < 0 {
        return format_to_power_of_ten(value, precision.unsigned_abs());
    }

    let precision = precision as u32;
    let scale = precision.min(MAX_SCALE);
    let mut truncated = value.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    if truncated.is_zero() {
        truncated.set_sign_positive(true);
    }

    pad_fraction(truncated.to_string(), precision as usize)
}

/// Format a float through its shortest decimal string, never through its
/// binary expansion, so `0.1 + 0.2` truncates like `0.3`.
pub fn format_f64(value: f64, precision: i32) -> Result<String> {
    Ok(format_decimal(decimal_from_f64(value)?, precision))
}

/// Parse a float via its `Display` form.
pub fn decimal_from_f64(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(BotError::invalid(format!("{value} is not a finite number")));
    }
    let repr = value.to_string();
    Decimal::from_str(&repr)
        .map_err(|err| BotError::invalid(format!("{repr} cannot be represented as a decimal: {err}")))
}

fn format_to_power_of_ten(value: Decimal, exp: u32) -> String {
    // Past 10^29 every Decimal floors to zero or to a single negative step.
    let exp = exp.min(MAX_SCALE + 1);
    let Some(factor) = pow10(exp) else {
        // |value| < 10^29 <= factor, so the floor is 0 or -1 steps.
        return if value.is_sign_negative() && !value.is_zero() {
            format!("-1{}", "0".repeat(exp as usize))
        } else {
            "0".to_string()
        };
    };

    let steps = (value / factor).floor();
    let floored = match steps.checked_mul(factor) {
        Some(v) => v,
        None => return format!("{}{}", steps.normalize(), "0".repeat(exp as usize)),
    };
    if floored.is_zero() {
        return "0".to_string();
    }
    floored.trunc().normalize().to_string()
}

fn pow10(exp: u32) -> Option<Decimal> {
    let mut factor = Decimal::ONE;
    for _ in 0..exp {
        factor = factor.checked_mul(Decimal::TEN)?;
    }
    Some(factor)
}

/// Right-pad the fractional part with zeros up to `precision` digits.
fn pad_fraction(mut s: String, precision: usize) -> String {
    if precision == 0 {
        if let Some(dot) = s.find('.') {
            s.truncate(dot);
        }
        return s;
    }

    let current = match s.find('.') {
        Some(dot) => s.len() - dot - 1,
        None => {
            s.push('.');
            0
        }
    };
    if current < precision {
        s.push_str(&"0".repeat(precision - current));
    }
    s
}
