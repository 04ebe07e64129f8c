//! Truncation rounding used for every derived quantity
//!
//! GMP logbooks never round half-up: a derived value is cut toward zero at a
//! fixed number of decimals before it is displayed or compared. Every
//! evaluator goes through [`truncate`].

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimals kept for concentrations, correction factors and regression coefficients
pub const CONC_DIGITS: u32 = 4;

/// Decimals kept for volumes in mL
pub const VOLUME_DIGITS: u32 = 3;

/// Decimals kept for means of retention time, area and responses
pub const MEAN_DIGITS: u32 = 3;

/// Decimals kept for RSD, interference and difference percentages
pub const PERCENT_DIGITS: u32 = 2;

/// Decimals kept for recovery percentages and signal-to-noise ratios
pub const RATIO_DIGITS: u32 = 1;

/// Truncate `value` toward zero, keeping exactly `digits` decimal places
///
/// The result always carries `digits` decimals of scale, so `3` truncated to
/// one digit serializes as `3.0`.
pub fn truncate(value: Decimal, digits: u32) -> Decimal {
    let mut cut = value.round_dp_with_strategy(digits, RoundingStrategy::ToZero);
    cut.rescale(digits);
    cut
}

/// Truncate an optional value, keeping blanks blank
pub fn truncate_opt(value: Option<Decimal>, digits: u32) -> Option<Decimal> {
    value.map(|v| truncate(v, digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_truncate_never_rounds_up() {
        assert_eq!(truncate(dec!(79.999), 1), dec!(79.9));
        assert_eq!(truncate(dec!(1.23456), 4), dec!(1.2345));
        assert_eq!(truncate(dec!(0.99999), 3), dec!(0.999));
    }

    #[test]
    fn test_truncate_negative_goes_toward_zero() {
        assert_eq!(truncate(dec!(-1.239), 2), dec!(-1.23));
    }

    #[test]
    fn test_truncate_pads_scale() {
        let v = truncate(dec!(3), 1);
        assert_eq!(v.to_string(), "3.0");
        let v = truncate(dec!(2), 3);
        assert_eq!(v.to_string(), "2.000");
    }

    #[test]
    fn test_truncate_opt_keeps_blank() {
        assert_eq!(truncate_opt(None, 2), None);
        assert_eq!(truncate_opt(Some(dec!(1.019)), 2), Some(dec!(1.01)));
    }
}
