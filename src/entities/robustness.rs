//! Robustness: system suitability repeated under deliberately varied conditions

use serde::{Deserialize, Serialize};

use crate::core::criteria::{EvaluationRecord, Metric};
use crate::entities::sst::{Injection, InjectionStats};

/// Injections acquired under one varied condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobustnessCondition {
    /// e.g. "Standard", "Flow +0.1 mL/min", "Column 35 °C"
    pub condition: String,

    #[serde(default)]
    pub injections: Vec<Injection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub condition: String,
    pub injections: usize,

    #[serde(flatten)]
    pub stats: InjectionStats,

    pub records: Vec<EvaluationRecord>,
}

/// Each condition stands on its own; there is no combined verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobustnessResult {
    pub conditions: Vec<ConditionResult>,
}

impl RobustnessResult {
    pub fn evaluate(conditions: &[RobustnessCondition]) -> Self {
        let conditions = conditions
            .iter()
            .map(|c| {
                let stats = InjectionStats::describe(&c.injections);
                let mut records = Vec::with_capacity(2);
                records.extend(EvaluationRecord::canonical(
                    format!("{} RSD (RT)", c.condition),
                    Metric::RobustnessRetentionTimeRsd,
                    stats.retention_time.rsd_percent,
                ));
                records.extend(EvaluationRecord::canonical(
                    format!("{} RSD (Area)", c.condition),
                    Metric::RobustnessAreaRsd,
                    stats.area.rsd_percent,
                ));
                ConditionResult {
                    condition: c.condition.clone(),
                    injections: c.injections.len(),
                    stats,
                    records,
                }
            })
            .collect();
        Self { conditions }
    }

    pub fn records(&self) -> impl Iterator<Item = &EvaluationRecord> {
        self.conditions.iter().flat_map(|c| c.records.iter())
    }
}
