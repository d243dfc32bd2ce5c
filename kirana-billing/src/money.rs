//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for the public records.

use rust_decimal::prelude::*;
use shared::RoundingMode;

/// Paise precision
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
///
/// Inputs are bounded by `validate_line` before they get here. A value
/// outside the Decimal range is logged and read as zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(
            value = ?value,
            "f64 outside Decimal range in money calculation, defaulting to zero"
        );
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 without rounding
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Round to paise, half away from zero
#[inline]
pub fn round_paise(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to whole rupees with the configured tie-breaking
pub fn round_rupees(value: Decimal, mode: RoundingMode) -> Decimal {
    let strategy = match mode {
        RoundingMode::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
        RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        RoundingMode::HalfTowardZero => RoundingStrategy::MidpointTowardZero,
        RoundingMode::Down => RoundingStrategy::ToNegativeInfinity,
        RoundingMode::Up => RoundingStrategy::ToPositiveInfinity,
    };
    value.round_dp_with_strategy(0, strategy)
}

/// Format an amount with two decimals ("1062.00")
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", round_paise(to_decimal(value)))
}

/// Format a signed adjustment ("+0.50", "-0.40")
pub fn format_signed(value: f64) -> String {
    let rounded = round_paise(to_decimal(value));
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{:.2}", rounded.abs())
    } else {
        format!("+{:.2}", rounded)
    }
}

/// Format a quantity without trailing zeros ("2", "1.25")
pub fn format_quantity(value: f64) -> String {
    let rounded = to_decimal(value).round_dp(3).normalize();
    rounded.to_string()
}

/// Format a GST rate ("5", "12", "0.25")
pub fn format_rate(value: f64) -> String {
    format_quantity(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_paise_half_up() {
        assert_eq!(round_paise(dec!(2.225)), dec!(2.23));
        assert_eq!(round_paise(dec!(1.6665)), dec!(1.67));
        assert_eq!(round_paise(dec!(0.004)), dec!(0.00));
    }

    #[test]
    fn test_round_rupees_modes() {
        let v = dec!(94.5);
        assert_eq!(round_rupees(v, RoundingMode::HalfAwayFromZero), dec!(95));
        assert_eq!(round_rupees(v, RoundingMode::HalfEven), dec!(94));
        assert_eq!(round_rupees(v, RoundingMode::HalfTowardZero), dec!(94));
        assert_eq!(round_rupees(dec!(95.5), RoundingMode::HalfEven), dec!(96));
        assert_eq!(round_rupees(dec!(94.01), RoundingMode::Up), dec!(95));
        assert_eq!(round_rupees(dec!(94.99), RoundingMode::Down), dec!(94));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1062.0), "1062.00");
        assert_eq!(format_amount(2.25), "2.25");
        assert_eq!(format_amount(0.0), "0.00");
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed(0.5), "+0.50");
        assert_eq!(format_signed(-0.4), "-0.40");
        assert_eq!(format_signed(0.0), "+0.00");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(1.25), "1.25");
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(18.0), "18");
    }
}
