//! Acceptance criteria, verdicts and the decision classifier
//!
//! Every threshold the engine compares against comes from
//! [`Criterion::canonical`]. Evaluators never build a numeric threshold of
//! their own; the one pluggable exception is the intermediate precision
//! day-to-day difference, which has no agreed limit and is configured.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of comparing a measured value against a criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Value satisfies the criterion
    Pass,
    /// Value violates the criterion
    Fail,
    /// Not enough data yet to decide
    Indeterminate,
}

impl Verdict {
    /// Combine verdicts that must all hold
    ///
    /// Any indeterminate input makes the result indeterminate, even when
    /// another input already failed.
    pub fn all<I: IntoIterator<Item = Verdict>>(verdicts: I) -> Verdict {
        let mut result = Verdict::Pass;
        for v in verdicts {
            match v {
                Verdict::Indeterminate => return Verdict::Indeterminate,
                Verdict::Fail => result = Verdict::Fail,
                Verdict::Pass => {}
            }
        }
        result
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
            Verdict::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// A numeric acceptance criterion (all bounds inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criterion {
    /// measured <= value
    MaxThreshold { value: Decimal },
    /// measured >= value
    MinThreshold { value: Decimal },
    /// low <= measured <= high
    Range { low: Decimal, high: Decimal },
}

impl Criterion {
    /// The canonical ICH Q2 threshold for a metric
    ///
    /// Returns `None` for metrics without an agreed limit.
    pub fn canonical(metric: Metric) -> Option<Criterion> {
        let criterion = match metric {
            Metric::SstRetentionTimeRsd | Metric::SstAreaRsd => Criterion::MaxThreshold {
                value: Decimal::new(20, 1),
            },
            Metric::SstTailing => Criterion::MaxThreshold {
                value: Decimal::new(20, 1),
            },
            Metric::SpecificityInterference => Criterion::MaxThreshold {
                value: Decimal::new(5, 1),
            },
            Metric::LinearityRSquared => Criterion::MinThreshold {
                value: Decimal::new(990, 3),
            },
            Metric::LinearityLevelRsd => Criterion::MaxThreshold {
                value: Decimal::new(50, 1),
            },
            Metric::AccuracyRecovery | Metric::AccuracyMeanRecovery => Criterion::Range {
                low: Decimal::new(800, 1),
                high: Decimal::new(1200, 1),
            },
            Metric::PrecisionRsd => Criterion::MaxThreshold {
                value: Decimal::new(20, 1),
            },
            Metric::LodSignalToNoise => Criterion::MinThreshold {
                value: Decimal::new(3, 0),
            },
            Metric::LoqSignalToNoise => Criterion::MinThreshold {
                value: Decimal::new(10, 0),
            },
            Metric::RobustnessRetentionTimeRsd | Metric::RobustnessAreaRsd => {
                Criterion::MaxThreshold {
                    value: Decimal::new(20, 1),
                }
            }
            Metric::IntermediatePrecisionDifference => return None,
        };
        Some(criterion)
    }

    /// Classify a measured value; a blank value is always indeterminate
    pub fn classify(&self, measured: Option<Decimal>) -> Verdict {
        let Some(m) = measured else {
            return Verdict::Indeterminate;
        };
        let ok = match *self {
            Criterion::MaxThreshold { value } => m <= value,
            Criterion::MinThreshold { value } => m >= value,
            Criterion::Range { low, high } => m >= low && m <= high,
        };
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Criterion::MaxThreshold { value } => write!(f, "≤ {}", value),
            Criterion::MinThreshold { value } => write!(f, "≥ {}", value),
            Criterion::Range { low, high } => write!(f, "{} – {}", low, high),
        }
    }
}

/// Every quantity the engine classifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    SstRetentionTimeRsd,
    SstAreaRsd,
    SstTailing,
    SpecificityInterference,
    LinearityRSquared,
    LinearityLevelRsd,
    AccuracyRecovery,
    AccuracyMeanRecovery,
    PrecisionRsd,
    IntermediatePrecisionDifference,
    LodSignalToNoise,
    LoqSignalToNoise,
    RobustnessRetentionTimeRsd,
    RobustnessAreaRsd,
}

impl Metric {
    /// All metrics in report order
    pub fn all() -> &'static [Metric] {
        &[
            Metric::SstRetentionTimeRsd,
            Metric::SstAreaRsd,
            Metric::SstTailing,
            Metric::SpecificityInterference,
            Metric::LinearityRSquared,
            Metric::LinearityLevelRsd,
            Metric::AccuracyRecovery,
            Metric::AccuracyMeanRecovery,
            Metric::PrecisionRsd,
            Metric::IntermediatePrecisionDifference,
            Metric::LodSignalToNoise,
            Metric::LoqSignalToNoise,
            Metric::RobustnessRetentionTimeRsd,
            Metric::RobustnessAreaRsd,
        ]
    }

    /// Human readable test name
    pub fn test_name(&self) -> &'static str {
        match self {
            Metric::SstRetentionTimeRsd | Metric::SstAreaRsd | Metric::SstTailing => {
                "System Suitability"
            }
            Metric::SpecificityInterference => "Specificity",
            Metric::LinearityRSquared | Metric::LinearityLevelRsd => "Linearity",
            Metric::AccuracyRecovery | Metric::AccuracyMeanRecovery => "Accuracy",
            Metric::PrecisionRsd => "Precision",
            Metric::IntermediatePrecisionDifference => "Intermediate Precision",
            Metric::LodSignalToNoise => "LOD",
            Metric::LoqSignalToNoise => "LOQ",
            Metric::RobustnessRetentionTimeRsd | Metric::RobustnessAreaRsd => "Robustness",
        }
    }

    /// Human readable measured quantity
    pub fn description(&self) -> &'static str {
        match self {
            Metric::SstRetentionTimeRsd => "RSD of retention time (%)",
            Metric::SstAreaRsd => "RSD of peak area (%)",
            Metric::SstTailing => "Tailing factor (1st injection)",
            Metric::SpecificityInterference => "Interference (% of reference area)",
            Metric::LinearityRSquared => "Coefficient of determination (R²)",
            Metric::LinearityLevelRsd => "Per-level response RSD (%)",
            Metric::AccuracyRecovery => "Recovery (%)",
            Metric::AccuracyMeanRecovery => "Mean recovery per level (%)",
            Metric::PrecisionRsd => "Repeatability RSD (%)",
            Metric::IntermediatePrecisionDifference => "Day-to-day difference of means (%)",
            Metric::LodSignalToNoise => "Signal-to-noise ratio",
            Metric::LoqSignalToNoise => "Signal-to-noise ratio",
            Metric::RobustnessRetentionTimeRsd => "RSD of retention time under condition (%)",
            Metric::RobustnessAreaRsd => "RSD of peak area under condition (%)",
        }
    }
}

/// One classified value in the validation dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// What was measured (e.g. "RSD (RT)", "80% rep 2")
    pub label: String,

    /// Metric being classified
    pub metric: Metric,

    /// Truncated measured value, blank when not computable yet
    pub measured_value: Option<Decimal>,

    /// Criterion the value was compared against
    pub criterion: Criterion,

    /// Outcome
    pub verdict: Verdict,
}

impl EvaluationRecord {
    /// Classify a value against the canonical criterion for `metric`
    ///
    /// Metrics without a canonical criterion must go through
    /// [`EvaluationRecord::with_criterion`]; for them this returns `None`.
    pub fn canonical(
        label: impl Into<String>,
        metric: Metric,
        measured_value: Option<Decimal>,
    ) -> Option<Self> {
        let criterion = Criterion::canonical(metric)?;
        Some(Self::with_criterion(label, metric, measured_value, criterion))
    }

    /// Classify a value against an explicitly supplied criterion
    pub fn with_criterion(
        label: impl Into<String>,
        metric: Metric,
        measured_value: Option<Decimal>,
        criterion: Criterion,
    ) -> Self {
        Self {
            label: label.into(),
            metric,
            measured_value,
            verdict: criterion.classify(measured_value),
            criterion,
        }
    }
}
