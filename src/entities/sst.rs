//! System suitability evaluation
//!
//! Replicate injections of the standard: retention time and area must be
//! repeatable and the first peak must not tail.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::criteria::{EvaluationRecord, Metric, Verdict};
use crate::core::stats::SeriesStats;

/// One chromatographic injection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_time: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tailing: Option<Decimal>,
}

impl Injection {
    pub fn new(
        retention_time: Option<Decimal>,
        area: Option<Decimal>,
        tailing: Option<Decimal>,
    ) -> Self {
        Self {
            retention_time,
            area,
            tailing,
        }
    }
}

/// Mean and RSD of retention time and area across a set of injections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionStats {
    pub retention_time: SeriesStats,
    pub area: SeriesStats,
}

impl InjectionStats {
    pub fn describe(injections: &[Injection]) -> Self {
        let rts: Vec<_> = injections.iter().map(|i| i.retention_time).collect();
        let areas: Vec<_> = injections.iter().map(|i| i.area).collect();
        Self {
            retention_time: SeriesStats::describe(&rts),
            area: SeriesStats::describe(&areas),
        }
    }
}

/// System suitability outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SstResult {
    /// Number of injections supplied
    pub injections: usize,

    #[serde(flatten)]
    pub stats: InjectionStats,

    /// Tailing factor of the first injection
    pub tailing: Option<Decimal>,

    pub records: Vec<EvaluationRecord>,

    /// Pass only when RT RSD, area RSD and tailing all pass
    pub verdict: Verdict,
}

impl SstResult {
    pub fn evaluate(injections: &[Injection]) -> Self {
        let stats = InjectionStats::describe(injections);
        let tailing = injections.first().and_then(|i| i.tailing);

        let mut records = Vec::with_capacity(3);
        records.extend(EvaluationRecord::canonical(
            "RSD (RT)",
            Metric::SstRetentionTimeRsd,
            stats.retention_time.rsd_percent,
        ));
        records.extend(EvaluationRecord::canonical(
            "RSD (Area)",
            Metric::SstAreaRsd,
            stats.area.rsd_percent,
        ));
        records.extend(EvaluationRecord::canonical(
            "Tailing (injection 1)",
            Metric::SstTailing,
            tailing,
        ));
        let verdict = Verdict::all(records.iter().map(|r| r.verdict));

        tracing::debug!(
            injections = injections.len(),
            rt_rsd = ?stats.retention_time.rsd_percent,
            area_rsd = ?stats.area.rsd_percent,
            %verdict,
            "system suitability"
        );

        Self {
            injections: injections.len(),
            stats,
            tailing,
            records,
            verdict,
        }
    }

    /// Reference area for specificity
    pub fn mean_area(&self) -> Option<Decimal> {
        self.stats.area.mean
    }
}
