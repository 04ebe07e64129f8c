//! Descriptive statistics over blank-capable decimal series
//!
//! Every helper is total: a blank value, a short series or a zero
//! denominator yields `None` instead of a panic.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::core::rounding::{truncate, MEAN_DIGITS, PERCENT_DIGITS};

/// Return the values only if every entry is filled in
pub fn complete(values: &[Option<Decimal>]) -> Option<Vec<Decimal>> {
    values.iter().copied().collect()
}

/// Keep only the filled-in values
pub fn present(values: &[Option<Decimal>]) -> Vec<Decimal> {
    values.iter().flatten().copied().collect()
}

/// Arithmetic mean (untruncated)
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sum = Decimal::ZERO;
    for v in values {
        sum = sum.checked_add(*v)?;
    }
    sum.checked_div(Decimal::from(values.len()))
}

/// Sample standard deviation (n - 1 denominator), untruncated
pub fn sample_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let mut sum_sq = Decimal::ZERO;
    for v in values {
        let d = v.checked_sub(m)?;
        sum_sq = sum_sq.checked_add(d.checked_mul(d)?)?;
    }
    let variance = sum_sq.checked_div(Decimal::from(values.len() - 1))?;
    variance.sqrt()
}

/// Relative standard deviation in percent (stdev / mean * 100), untruncated
pub fn rsd_percent(values: &[Decimal]) -> Option<Decimal> {
    let m = mean(values)?;
    if m.is_zero() {
        return None;
    }
    let sd = sample_std_dev(values)?;
    sd.checked_div(m)?.checked_mul(Decimal::ONE_HUNDRED)
}

/// Truncated summary of a replicate series
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Number of values supplied (blank or not)
    pub n: usize,

    /// Mean, truncated to 3 decimals
    pub mean: Option<Decimal>,

    /// Relative standard deviation in percent, truncated to 2 decimals
    pub rsd_percent: Option<Decimal>,
}

impl SeriesStats {
    /// Summarize a series; both figures stay blank unless every value is
    /// present and there are at least two of them
    pub fn describe(values: &[Option<Decimal>]) -> Self {
        let n = values.len();
        match complete(values) {
            Some(filled) if filled.len() >= 2 => Self {
                n,
                mean: mean(&filled).map(|m| truncate(m, MEAN_DIGITS)),
                rsd_percent: rsd_percent(&filled).map(|r| truncate(r, PERCENT_DIGITS)),
            },
            _ => Self {
                n,
                mean: None,
                rsd_percent: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        assert_eq!(mean(&values), Some(dec!(5)));
        // Sample variance = 32 / 7
        let sd = sample_std_dev(&values).unwrap();
        assert!((sd - dec!(2.13808993529939)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_rsd_zero_mean_is_blank() {
        assert_eq!(rsd_percent(&[dec!(-1), dec!(1)]), None);
    }

    #[test]
    fn test_single_value_has_no_std_dev() {
        assert_eq!(sample_std_dev(&[dec!(3)]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_describe_blank_propagates() {
        let stats = SeriesStats::describe(&[Some(dec!(100)), None, Some(dec!(101))]);
        assert_eq!(stats.n, 3);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.rsd_percent, None);
    }

    #[test]
    fn test_describe_truncates() {
        let stats = SeriesStats::describe(&[Some(dec!(100)), Some(dec!(102)), Some(dec!(101))]);
        assert_eq!(stats.mean, Some(dec!(101.000)));
        // sd = 1, rsd = 0.990099...
        assert_eq!(stats.rsd_percent, Some(dec!(0.99)));
    }

    #[test]
    fn test_present_skips_blanks() {
        assert_eq!(present(&[Some(dec!(1)), None, Some(dec!(2))]), vec![dec!(1), dec!(2)]);
        assert_eq!(complete(&[Some(dec!(1)), None]), None);
    }
}
