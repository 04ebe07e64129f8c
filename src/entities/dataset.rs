//! The derived dataset of one validation run
//!
//! Sections that the method does not require are absent. The summary is
//! recomputed from the section records, never edited by hand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::config::ConcentrationBasis;
use crate::core::criteria::{EvaluationRecord, Verdict};
use crate::core::dilution::DilutionLevel;
use crate::core::plan::TestSection;
use crate::core::stock::StockCorrection;
use crate::entities::accuracy::AccuracyResult;
use crate::entities::linearity::LinearityResult;
use crate::entities::method::MethodParameters;
use crate::entities::precision::PrecisionResult;
use crate::entities::robustness::RobustnessResult;
use crate::entities::sensitivity::SensitivityResult;
use crate::entities::specificity::SpecificityResult;
use crate::entities::sst::SstResult;

/// Number of records per verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub pass: usize,
    pub fail: usize,
    pub indeterminate: usize,
}

impl VerdictCounts {
    pub fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pass => self.pass += 1,
            Verdict::Fail => self.fail += 1,
            Verdict::Indeterminate => self.indeterminate += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pass + self.fail + self.indeterminate
    }

    /// Combined verdict; nothing to judge counts as indeterminate
    pub fn verdict(&self) -> Verdict {
        if self.total() == 0 || self.indeterminate > 0 {
            Verdict::Indeterminate
        } else if self.fail > 0 {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }
}

/// Whether every required value has been entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    /// No indeterminate record left
    Complete,
    Incomplete,
}

impl std::fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetStatus::Complete => write!(f, "complete"),
            DatasetStatus::Incomplete => write!(f, "incomplete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub sections: BTreeMap<TestSection, VerdictCounts>,
    pub totals: VerdictCounts,
    pub status: DatasetStatus,
    pub verdict: Verdict,
}

impl Default for DatasetSummary {
    fn default() -> Self {
        Self {
            sections: BTreeMap::new(),
            totals: VerdictCounts::default(),
            status: DatasetStatus::Incomplete,
            verdict: Verdict::Indeterminate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDataset {
    pub method: MethodParameters,

    /// SHA-256 of the input snapshot and the evaluation policy
    pub input_digest: String,

    pub concentration_basis: ConcentrationBasis,

    pub stock: StockCorrection,

    /// Flask recipes for every prepared level
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipes: Vec<DilutionLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sst: Option<SstResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specificity: Option<SpecificityResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linearity: Option<LinearityResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<AccuracyResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<PrecisionResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lod_loq: Option<SensitivityResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robustness: Option<RobustnessResult>,

    pub summary: DatasetSummary,
}

impl ValidationDataset {
    /// Records of one section, or `None` if the section was not evaluated
    pub fn section_records(&self, section: TestSection) -> Option<Vec<&EvaluationRecord>> {
        match section {
            TestSection::Sst => self.sst.as_ref().map(|s| s.records.iter().collect()),
            TestSection::Specificity => {
                self.specificity.as_ref().map(|s| s.records.iter().collect())
            }
            TestSection::Linearity => self.linearity.as_ref().map(|s| s.records.iter().collect()),
            TestSection::Accuracy => self.accuracy.as_ref().map(|s| s.records.iter().collect()),
            TestSection::Precision => self.precision.as_ref().map(|s| s.records.iter().collect()),
            TestSection::LodLoq => self.lod_loq.as_ref().map(|s| s.records.iter().collect()),
            TestSection::Robustness => self.robustness.as_ref().map(|s| s.records().collect()),
        }
    }

    /// Combined verdict of one evaluated section
    ///
    /// Robustness conditions are judged one by one and never combined, so
    /// that section has none.
    pub fn section_verdict(&self, section: TestSection) -> Option<Verdict> {
        if section == TestSection::Robustness {
            return None;
        }
        self.summary.sections.get(&section).map(VerdictCounts::verdict)
    }

    /// Evaluated sections in logbook order
    pub fn sections(&self) -> Vec<TestSection> {
        TestSection::all()
            .iter()
            .copied()
            .filter(|s| self.section_records(*s).is_some())
            .collect()
    }

    /// Rebuild the summary from the section records
    pub fn summarize(&mut self) {
        let mut sections = BTreeMap::new();
        let mut totals = VerdictCounts::default();
        for section in self.sections() {
            let mut counts = VerdictCounts::default();
            for record in self.section_records(section).unwrap_or_default() {
                counts.add(record.verdict);
                totals.add(record.verdict);
            }
            sections.insert(section, counts);
        }
        self.summary = DatasetSummary {
            sections,
            totals,
            status: if totals.indeterminate == 0 {
                DatasetStatus::Complete
            } else {
                DatasetStatus::Incomplete
            },
            verdict: totals.verdict(),
        };
    }
}
