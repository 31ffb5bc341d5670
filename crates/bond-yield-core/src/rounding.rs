use rust_decimal::Decimal;

use crate::error::BondYieldError;
use crate::types::{Money, Percent};

/// Decimal places for monetary outputs.
pub const MONEY_DP: u32 = 2;

/// Decimal places for yield percentages.
pub const PERCENT_DP: u32 = 6;

/// Round `value` to `dp` decimal places, half away from zero.
///
/// The scaled magnitude is nudged by `f64::EPSILON` before rounding so that
/// values such as 1.005 (stored as 1.00499999999999989...) land on the side
/// their decimal spelling suggests. The result is built from the integer
/// mantissa, so no further binary error creeps into the Decimal.
pub fn round_half_away(value: f64, dp: u32) -> Result<Decimal, BondYieldError> {
    if !value.is_finite() {
        return Err(BondYieldError::FinancialImpossibility(format!(
            "cannot round non-finite value {value}"
        )));
    }

    let factor = 10f64.powi(dp as i32);
    let scaled = (value.abs() + f64::EPSILON) * factor;
    let mantissa = scaled.round().copysign(value) as i128;

    Decimal::try_from_i128_with_scale(mantissa, dp).map_err(|e| {
        BondYieldError::FinancialImpossibility(format!("{value} does not fit a decimal: {e}"))
    })
}

/// Round a monetary amount to cents.
pub fn round_money(value: f64) -> Result<Money, BondYieldError> {
    round_half_away(value, MONEY_DP)
}

/// Round a yield percentage to 6 dp.
pub fn round_pct(value: f64) -> Result<Percent, BondYieldError> {
    round_half_away(value, PERCENT_DP)
}
