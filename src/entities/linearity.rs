//! Linearity: calibration fits over the concentration levels
//!
//! Each replicate series gets its own least-squares line; the pooled line is
//! fitted through the mean response of every level and is the calibration
//! used downstream for accuracy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::criteria::{EvaluationRecord, Metric};
use crate::core::dilution::ConcentrationScale;
use crate::core::regression::{fit, RegressionResult};
use crate::core::rounding::{truncate, MEAN_DIGITS};
use crate::core::stats::{complete, mean, SeriesStats};

/// Responses measured at one concentration level, one per replicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelResponses {
    pub level_percent: Decimal,

    #[serde(default)]
    pub responses: Vec<Option<Decimal>>,
}

impl LevelResponses {
    pub fn new(level_percent: Decimal, responses: Vec<Option<Decimal>>) -> Self {
        Self {
            level_percent,
            responses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearityLevel {
    pub level_percent: Decimal,
    pub theoretical_conc: Option<Decimal>,
    pub responses: Vec<Option<Decimal>>,

    /// Mean response used for the pooled fit; blank if any replicate is
    pub mean_response: Option<Decimal>,

    pub rsd_percent: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearityResult {
    pub levels: Vec<LinearityLevel>,

    /// One fit per replicate index
    pub replicate_fits: Vec<RegressionResult>,

    /// Fit through the per-level mean responses
    pub pooled: RegressionResult,

    pub records: Vec<EvaluationRecord>,
}

/// Points for a fit; any unknown concentration makes the whole fit blank
fn fit_points(
    levels: &[LinearityLevel],
    response: impl Fn(&LinearityLevel) -> Option<Decimal>,
) -> RegressionResult {
    let points: Option<Vec<(Decimal, Option<Decimal>)>> = levels
        .iter()
        .map(|l| l.theoretical_conc.map(|x| (x, response(l))))
        .collect();
    match points {
        Some(points) => fit(&points),
        None => RegressionResult::indeterminate(levels.len()),
    }
}

impl LinearityResult {
    pub fn evaluate(levels: &[LevelResponses], scale: &ConcentrationScale) -> Self {
        let rows: Vec<LinearityLevel> = levels
            .iter()
            .map(|l| {
                let mean_response = complete(&l.responses)
                    .and_then(|filled| mean(&filled))
                    .map(|m| truncate(m, MEAN_DIGITS));
                LinearityLevel {
                    level_percent: l.level_percent,
                    theoretical_conc: scale.theoretical(l.level_percent),
                    responses: l.responses.clone(),
                    mean_response,
                    rsd_percent: SeriesStats::describe(&l.responses).rsd_percent,
                }
            })
            .collect();

        let replicates = rows.iter().map(|l| l.responses.len()).max().unwrap_or(0);
        let replicate_fits: Vec<RegressionResult> = (0..replicates)
            .map(|rep| fit_points(&rows, |l| l.responses.get(rep).copied().flatten()))
            .collect();
        let pooled = fit_points(&rows, |l| l.mean_response);

        let mut records = Vec::new();
        for level in &rows {
            records.extend(EvaluationRecord::canonical(
                format!("{}% RSD", level.level_percent),
                Metric::LinearityLevelRsd,
                level.rsd_percent,
            ));
        }
        records.extend(EvaluationRecord::canonical(
            "R² (pooled)",
            Metric::LinearityRSquared,
            pooled.r_squared,
        ));
        for (i, rep) in replicate_fits.iter().enumerate() {
            records.extend(EvaluationRecord::canonical(
                format!("R² (rep {})", i + 1),
                Metric::LinearityRSquared,
                rep.r_squared,
            ));
        }

        tracing::debug!(
            levels = rows.len(),
            replicates,
            slope = ?pooled.slope,
            intercept = ?pooled.intercept,
            r_squared = ?pooled.r_squared,
            "pooled calibration"
        );

        Self {
            levels: rows,
            replicate_fits,
            pooled,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConcentrationBasis;
    use crate::core::criteria::Verdict;
    use rust_decimal_macros::dec;

    fn nominal(target: Decimal) -> ConcentrationScale {
        ConcentrationScale::new(target, Some(Decimal::ONE), ConcentrationBasis::Nominal)
    }

    /// Response = 1000 × conc exactly, three identical replicates
    fn ideal_levels() -> Vec<LevelResponses> {
        [80, 90, 100, 110, 120]
            .iter()
            .map(|&p| {
                let y = Decimal::from(p * 10);
                LevelResponses::new(Decimal::from(p), vec![Some(y), Some(y), Some(y)])
            })
            .collect()
    }

    #[test]
    fn test_ideal_calibration() {
        let result = LinearityResult::evaluate(&ideal_levels(), &nominal(dec!(1.0)));
        assert_eq!(result.levels[0].theoretical_conc, Some(dec!(0.8)));
        assert_eq!(result.pooled.slope, Some(dec!(1000)));
        assert_eq!(result.pooled.intercept, Some(dec!(0)));
        assert_eq!(result.pooled.r_squared, Some(dec!(1)));
        assert_eq!(result.replicate_fits.len(), 3);
        // 5 level RSDs + pooled R² + 3 replicate R²
        assert_eq!(result.records.len(), 9);
        assert!(result.records.iter().all(|r| r.verdict == Verdict::Pass));
    }

    #[test]
    fn test_blank_response_blanks_its_fits_only() {
        let mut levels = ideal_levels();
        levels[2].responses[1] = None;
        let result = LinearityResult::evaluate(&levels, &nominal(dec!(1.0)));

        assert_eq!(result.levels[2].mean_response, None);
        assert!(!result.pooled.is_determinate());
        assert!(result.replicate_fits[0].is_determinate());
        assert!(!result.replicate_fits[1].is_determinate());
        assert!(result.replicate_fits[2].is_determinate());

        let pooled = result
            .records
            .iter()
            .find(|r| r.label == "R² (pooled)")
            .unwrap();
        assert_eq!(pooled.verdict, Verdict::Indeterminate);
    }

    #[test]
    fn test_unknown_correction_factor_blanks_calibration() {
        let scale = ConcentrationScale::new(dec!(1.0), None, ConcentrationBasis::Corrected);
        let result = LinearityResult::evaluate(&ideal_levels(), &scale);
        assert_eq!(result.levels[0].theoretical_conc, None);
        assert!(!result.pooled.is_determinate());
    }

    #[test]
    fn test_scattered_level_fails_rsd() {
        let mut levels = ideal_levels();
        levels[0].responses = vec![Some(dec!(800)), Some(dec!(900)), Some(dec!(700))];
        let result = LinearityResult::evaluate(&levels, &nominal(dec!(1.0)));
        // mean 800, sd 100 -> 12.5 %
        assert_eq!(result.levels[0].rsd_percent, Some(dec!(12.50)));
        assert_eq!(result.records[0].verdict, Verdict::Fail);
    }

    #[test]
    fn test_single_level_is_indeterminate() {
        let levels = vec![LevelResponses::new(dec!(100), vec![Some(dec!(1000))])];
        let result = LinearityResult::evaluate(&levels, &nominal(dec!(1.0)));
        assert!(!result.pooled.is_determinate());
        assert_eq!(result.levels[0].rsd_percent, None);
    }
}
