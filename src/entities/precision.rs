//! Precision: repeatability and intermediate precision

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::criteria::{Criterion, EvaluationRecord, Metric};
use crate::core::rounding::{truncate, PERCENT_DIGITS};
use crate::core::stats::SeriesStats;

/// Responses of the independent preparations at 100 %
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecisionInputs {
    /// First set (day 1 / analyst 1)
    #[serde(default)]
    pub repeatability: Vec<Option<Decimal>>,

    /// Second set on another day or by another analyst; empty when not run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediate: Vec<Option<Decimal>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecisionResult {
    pub repeatability: SeriesStats,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<SeriesStats>,

    /// Difference between the two set means, relative to their average
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference_percent: Option<Decimal>,

    pub records: Vec<EvaluationRecord>,
}

/// `trunc(|m1 − m2| / mean(m1, m2) × 100, 2)`
pub fn difference_percent(m1: Option<Decimal>, m2: Option<Decimal>) -> Option<Decimal> {
    let (m1, m2) = (m1?, m2?);
    let average = m1.checked_add(m2)?.checked_div(Decimal::TWO)?;
    let diff = m1.checked_sub(m2)?.abs();
    let pct = diff.checked_div(average)?.checked_mul(Decimal::ONE_HUNDRED)?;
    Some(truncate(pct, PERCENT_DIGITS))
}

impl PrecisionResult {
    /// `max_difference` is the configured intermediate precision limit; without
    /// one the difference is reported but not judged
    pub fn evaluate(inputs: &PrecisionInputs, max_difference: Option<Decimal>) -> Self {
        let repeatability = SeriesStats::describe(&inputs.repeatability);
        let mut records = Vec::new();
        records.extend(EvaluationRecord::canonical(
            "Repeatability RSD",
            Metric::PrecisionRsd,
            repeatability.rsd_percent,
        ));

        let mut intermediate = None;
        let mut difference = None;
        if !inputs.intermediate.is_empty() {
            let second = SeriesStats::describe(&inputs.intermediate);
            records.extend(EvaluationRecord::canonical(
                "Intermediate RSD",
                Metric::PrecisionRsd,
                second.rsd_percent,
            ));
            difference = difference_percent(repeatability.mean, second.mean);
            if let Some(limit) = max_difference {
                records.push(EvaluationRecord::with_criterion(
                    "Intermediate difference",
                    Metric::IntermediatePrecisionDifference,
                    difference,
                    Criterion::MaxThreshold { value: limit },
                ));
            }
            intermediate = Some(second);
        }

        Self {
            repeatability,
            intermediate,
            difference_percent: difference,
            records,
        }
    }
}
