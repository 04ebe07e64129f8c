//! Accuracy: recovery of spiked levels read off the pooled calibration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::criteria::{EvaluationRecord, Metric};
use crate::core::dilution::ConcentrationScale;
use crate::core::regression::{back_calculate, RegressionResult};
use crate::core::rounding::{truncate, RATIO_DIGITS};
use crate::core::stats::{mean, present};
use crate::entities::linearity::LevelResponses;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyReplicate {
    /// 1-based replicate number
    pub replicate: usize,
    pub response: Option<Decimal>,
    pub calculated_conc: Option<Decimal>,
    pub recovery_percent: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyLevel {
    pub level_percent: Decimal,
    pub theoretical_conc: Option<Decimal>,
    pub replicates: Vec<AccuracyReplicate>,

    /// Mean over the replicates that have a recovery
    pub mean_recovery_percent: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyResult {
    pub levels: Vec<AccuracyLevel>,
    pub records: Vec<EvaluationRecord>,
}

/// `trunc(calculated / theoretical × 100, 1)`
pub fn recovery_percent(calculated: Option<Decimal>, theoretical: Option<Decimal>) -> Option<Decimal> {
    let ratio = calculated?.checked_div(theoretical?)?;
    Some(truncate(ratio.checked_mul(Decimal::ONE_HUNDRED)?, RATIO_DIGITS))
}

impl AccuracyResult {
    /// Only the pooled calibration is used for back-calculation
    pub fn evaluate(
        levels: &[LevelResponses],
        scale: &ConcentrationScale,
        pooled: &RegressionResult,
    ) -> Self {
        let mut rows = Vec::with_capacity(levels.len());
        let mut records = Vec::new();

        for level in levels {
            let theoretical = scale.theoretical(level.level_percent);
            let replicates: Vec<AccuracyReplicate> = level
                .responses
                .iter()
                .enumerate()
                .map(|(i, response)| {
                    let calculated = back_calculate(*response, pooled);
                    AccuracyReplicate {
                        replicate: i + 1,
                        response: *response,
                        calculated_conc: calculated,
                        recovery_percent: recovery_percent(calculated, theoretical),
                    }
                })
                .collect();

            let recoveries: Vec<_> = replicates.iter().map(|r| r.recovery_percent).collect();
            let mean_recovery = mean(&present(&recoveries)).map(|m| truncate(m, RATIO_DIGITS));

            for rep in &replicates {
                records.extend(EvaluationRecord::canonical(
                    format!("{}% rep {}", level.level_percent, rep.replicate),
                    Metric::AccuracyRecovery,
                    rep.recovery_percent,
                ));
            }
            records.extend(EvaluationRecord::canonical(
                format!("{}% mean", level.level_percent),
                Metric::AccuracyMeanRecovery,
                mean_recovery,
            ));

            rows.push(AccuracyLevel {
                level_percent: level.level_percent,
                theoretical_conc: theoretical,
                replicates,
                mean_recovery_percent: mean_recovery,
            });
        }

        Self {
            levels: rows,
            records,
        }
    }
}
