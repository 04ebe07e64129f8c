//! Ordinary least-squares calibration fits
//!
//! A fit stays blank until every contributing response has been measured.
//! R² is always computed from the same point set as slope and intercept.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::rounding::{truncate, CONC_DIGITS};

/// Calibration line `y = slope · x + intercept`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Number of points offered to the fit
    pub n: usize,

    /// Slope, truncated to 4 decimals
    pub slope: Option<Decimal>,

    /// Intercept, truncated to 4 decimals
    pub intercept: Option<Decimal>,

    /// Coefficient of determination, truncated to 4 decimals
    pub r_squared: Option<Decimal>,
}

impl RegressionResult {
    /// A fit that cannot be computed yet
    pub fn indeterminate(n: usize) -> Self {
        Self {
            n,
            slope: None,
            intercept: None,
            r_squared: None,
        }
    }

    pub fn is_determinate(&self) -> bool {
        self.slope.is_some() && self.intercept.is_some() && self.r_squared.is_some()
    }
}

/// Fit a line through `(x, y)` pairs
///
/// Needs at least two points and no blank response. Degenerate data (all x
/// equal, or all y equal so R² is undefined) is indeterminate as well.
pub fn fit(points: &[(Decimal, Option<Decimal>)]) -> RegressionResult {
    let n = points.len();
    if n < 2 {
        return RegressionResult::indeterminate(n);
    }
    let filled: Option<Vec<(Decimal, Decimal)>> =
        points.iter().map(|(x, y)| y.map(|y| (*x, y))).collect();
    let Some(filled) = filled else {
        return RegressionResult::indeterminate(n);
    };

    match least_squares(&filled) {
        Some((slope, intercept, r_squared)) => RegressionResult {
            n,
            slope: Some(truncate(slope, CONC_DIGITS)),
            intercept: Some(truncate(intercept, CONC_DIGITS)),
            r_squared: Some(truncate(r_squared, CONC_DIGITS)),
        },
        None => RegressionResult::indeterminate(n),
    }
}

fn least_squares(points: &[(Decimal, Decimal)]) -> Option<(Decimal, Decimal, Decimal)> {
    let count = Decimal::from(points.len());
    let mut sum_x = Decimal::ZERO;
    let mut sum_y = Decimal::ZERO;
    for (x, y) in points {
        sum_x = sum_x.checked_add(*x)?;
        sum_y = sum_y.checked_add(*y)?;
    }
    let mean_x = sum_x.checked_div(count)?;
    let mean_y = sum_y.checked_div(count)?;

    let mut sxx = Decimal::ZERO;
    let mut sxy = Decimal::ZERO;
    let mut syy = Decimal::ZERO;
    for (x, y) in points {
        let dx = x.checked_sub(mean_x)?;
        let dy = y.checked_sub(mean_y)?;
        sxx = sxx.checked_add(dx.checked_mul(dx)?)?;
        sxy = sxy.checked_add(dx.checked_mul(dy)?)?;
        syy = syy.checked_add(dy.checked_mul(dy)?)?;
    }
    if sxx.is_zero() || syy.is_zero() {
        return None;
    }

    let slope = sxy.checked_div(sxx)?;
    let intercept = mean_y.checked_sub(slope.checked_mul(mean_x)?)?;
    let r_squared = sxy
        .checked_mul(sxy)?
        .checked_div(sxx.checked_mul(syy)?)?;
    Some((slope, intercept, r_squared))
}

/// Concentration for a response read off a calibration line
///
/// `x = (y − intercept) / slope`, truncated to 4 decimals; blank when the
/// response is blank or the slope is blank or zero.
pub fn back_calculate(response: Option<Decimal>, regression: &RegressionResult) -> Option<Decimal> {
    let y = response?;
    let slope = regression.slope?;
    let intercept = regression.intercept?;
    if slope.is_zero() {
        return None;
    }
    let x = y.checked_sub(intercept)?.checked_div(slope)?;
    Some(truncate(x, CONC_DIGITS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_perfect_line() {
        let points = [
            (dec!(1), Some(dec!(2))),
            (dec!(2), Some(dec!(4))),
            (dec!(3), Some(dec!(6))),
        ];
        let r = fit(&points);
        assert_eq!(r.slope, Some(dec!(2)));
        assert_eq!(r.intercept, Some(dec!(0)));
        assert_eq!(r.r_squared, Some(dec!(1)));
        assert!(r.is_determinate());
    }

    #[test]
    fn test_noisy_line() {
        // x̄ = 2, ȳ = 2.1, Sxx = 2, Sxy = 2.0, Syy = 2.06
        let points = [
            (dec!(1), Some(dec!(1.2))),
            (dec!(2), Some(dec!(1.9))),
            (dec!(3), Some(dec!(3.2))),
        ];
        let r = fit(&points);
        assert_eq!(r.slope, Some(dec!(1.0)));
        assert_eq!(r.intercept, Some(dec!(0.1)));
        // 4 / 4.12 = 0.970873...
        assert_eq!(r.r_squared, Some(dec!(0.9708)));
    }

    #[test]
    fn test_blank_response_makes_fit_indeterminate() {
        let points = [
            (dec!(1), Some(dec!(2))),
            (dec!(2), None),
            (dec!(3), Some(dec!(6))),
        ];
        let r = fit(&points);
        assert_eq!(r, RegressionResult::indeterminate(3));
    }

    #[test]
    fn test_too_few_points() {
        assert!(!fit(&[(dec!(1), Some(dec!(2)))]).is_determinate());
        assert!(!fit(&[]).is_determinate());
    }

    #[test]
    fn test_degenerate_x_is_indeterminate() {
        let points = [(dec!(1), Some(dec!(2))), (dec!(1), Some(dec!(3)))];
        assert!(!fit(&points).is_determinate());
    }

    #[test]
    fn test_back_calculate() {
        let r = RegressionResult {
            n: 5,
            slope: Some(dec!(1000)),
            intercept: Some(dec!(5)),
            r_squared: Some(dec!(0.9999)),
        };
        assert_eq!(back_calculate(Some(dec!(1005)), &r), Some(dec!(1.0)));
        assert_eq!(back_calculate(Some(dec!(805.55555)), &r), Some(dec!(0.8005)));
        assert_eq!(back_calculate(None, &r), None);
    }

    #[test]
    fn test_back_calculate_zero_or_blank_slope() {
        let mut r = RegressionResult {
            n: 2,
            slope: Some(Decimal::ZERO),
            intercept: Some(dec!(1)),
            r_squared: Some(dec!(1)),
        };
        assert_eq!(back_calculate(Some(dec!(10)), &r), None);
        r.slope = None;
        assert_eq!(back_calculate(Some(dec!(10)), &r), None);
    }
}
