//! Money calculation utilities using rust_decimal for precision
//!
//! 金额内部统一用 `Decimal` 运算，出入库/序列化边界用 `f64`。

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
///
/// Input values should be pre-validated at the boundary. If NaN/Infinity
/// somehow reaches here, logs an error and returns ZERO to avoid silent
/// data corruption in financial calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// 金额相加，逐项转 Decimal 求和后回到 f64
pub fn sum(amounts: impl Iterator<Item = f64>) -> f64 {
    let total: Decimal = amounts.map(to_decimal).sum();
    to_f64(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_avoids_float_drift() {
        // 0.1 + 0.2 in raw f64 is 0.30000000000000004
        assert_eq!(sum([0.1, 0.2].into_iter()), 0.3);
        assert_eq!(sum([1000.55, 2000.45].into_iter()), 3001.0);
        assert_eq!(sum(std::iter::empty()), 0.0);
    }

    #[test]
    fn to_f64_rounds_half_away_from_zero() {
        let d = Decimal::new(10005, 3); // 10.005
        assert_eq!(to_f64(d), 10.01);
    }

    #[test]
    fn non_finite_input_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }
}
