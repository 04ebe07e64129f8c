//! Specificity: interference of blank, placebo and impurity injections

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::criteria::{EvaluationRecord, Metric};
use crate::core::rounding::{truncate, PERCENT_DIGITS};

/// Peak area measured at the analyte retention time in a specificity injection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificitySample {
    /// What was injected (e.g. "Blank", "Placebo")
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterferenceRow {
    pub label: String,
    pub area: Option<Decimal>,
    pub interference_percent: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificityResult {
    /// Mean standard area from system suitability
    pub reference_mean_area: Option<Decimal>,
    pub samples: Vec<InterferenceRow>,
    pub records: Vec<EvaluationRecord>,
}

/// `trunc(area / reference × 100, 2)`; blank on a blank or zero reference
pub fn interference_percent(area: Option<Decimal>, reference: Option<Decimal>) -> Option<Decimal> {
    let area = area?;
    let reference = reference?;
    let ratio = area.checked_div(reference)?;
    Some(truncate(ratio.checked_mul(Decimal::ONE_HUNDRED)?, PERCENT_DIGITS))
}

impl SpecificityResult {
    /// The reference mean area is taken as given, never recomputed here
    pub fn evaluate(samples: &[SpecificitySample], reference_mean_area: Option<Decimal>) -> Self {
        let mut rows = Vec::with_capacity(samples.len());
        let mut records = Vec::with_capacity(samples.len());

        for sample in samples {
            let interference = interference_percent(sample.area, reference_mean_area);
            records.extend(EvaluationRecord::canonical(
                format!("{} interference", sample.label),
                Metric::SpecificityInterference,
                interference,
            ));
            rows.push(InterferenceRow {
                label: sample.label.clone(),
                area: sample.area,
                interference_percent: interference,
            });
        }

        Self {
            reference_mean_area,
            samples: rows,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::Verdict;
    use rust_decimal_macros::dec;

    fn sample(label: &str, area: Option<Decimal>) -> SpecificitySample {
        SpecificitySample {
            label: label.to_string(),
            area,
        }
    }

    #[test]
    fn test_interference_boundary() {
        let samples = [
            sample("Blank", Some(dec!(0))),
            sample("Placebo", Some(dec!(5))),
            sample("Impurity A", Some(dec!(5.1))),
        ];
        let result = SpecificityResult::evaluate(&samples, Some(dec!(1000)));
        assert_eq!(result.samples[1].interference_percent, Some(dec!(0.50)));
        let verdicts: Vec<_> = result.records.iter().map(|r| r.verdict).collect();
        assert_eq!(verdicts, vec![Verdict::Pass, Verdict::Pass, Verdict::Fail]);
    }

    #[test]
    fn test_truncates_rather_than_rounds() {
        // 5.0099 / 1000 * 100 = 0.50099
        assert_eq!(
            interference_percent(Some(dec!(5.0099)), Some(dec!(1000))),
            Some(dec!(0.50))
        );
    }

    #[test]
    fn test_missing_reference_is_indeterminate() {
        let result = SpecificityResult::evaluate(&[sample("Blank", Some(dec!(1)))], None);
        assert_eq!(result.records[0].verdict, Verdict::Indeterminate);
        assert_eq!(interference_percent(Some(dec!(1)), Some(Decimal::ZERO)), None);
    }

    #[test]
    fn test_blank_area_is_indeterminate() {
        let result = SpecificityResult::evaluate(&[sample("Placebo", None)], Some(dec!(1000)));
        assert_eq!(result.samples[0].interference_percent, None);
        assert_eq!(result.records[0].verdict, Verdict::Indeterminate);
    }
}
