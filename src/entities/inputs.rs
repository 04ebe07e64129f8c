//! The raw input snapshot of one validation run
//!
//! Everything the engine needs is in [`ValidationInputs`]; blank cells are
//! `None`. [`ValidationInputs::check`] looks for values that are present but
//! physically implausible. Those checks only inform the user and never alter
//! what the engine computes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::plan::{TestSection, ValidationPlan};
use crate::core::stock::StockPreparation;
use crate::entities::linearity::LevelResponses;
use crate::entities::method::MethodParameters;
use crate::entities::precision::PrecisionInputs;
use crate::entities::robustness::RobustnessCondition;
use crate::entities::sensitivity::SignalNoise;
use crate::entities::specificity::SpecificitySample;
use crate::entities::sst::Injection;

/// Replicates per linearity / accuracy level
pub const LEVEL_REPLICATES: usize = 3;

/// Independent preparations per precision set
pub const PRECISION_PREPARATIONS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationInputs {
    pub method: MethodParameters,

    #[serde(default)]
    pub stock: StockPreparation,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sst: Vec<Injection>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specificity: Vec<SpecificitySample>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linearity: Vec<LevelResponses>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accuracy: Vec<LevelResponses>,

    #[serde(default)]
    pub precision: PrecisionInputs,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lod_loq: Vec<SignalNoise>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub robustness: Vec<RobustnessCondition>,
}

/// How serious an input issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A problem found in an input snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIssue {
    pub severity: Severity,

    /// Dotted path of the offending field (e.g. `stock.purity_percent`)
    pub field: String,

    pub message: String,
}

impl InputIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ValidationInputs {
    /// An empty snapshot for a method
    pub fn new(method: MethodParameters) -> Self {
        Self {
            method,
            stock: StockPreparation::default(),
            sst: Vec::new(),
            specificity: Vec::new(),
            linearity: Vec::new(),
            accuracy: Vec::new(),
            precision: PrecisionInputs::default(),
            lod_loq: Vec::new(),
            robustness: Vec::new(),
        }
    }

    pub fn plan(&self) -> ValidationPlan {
        self.method.plan()
    }

    /// Every level percent the run prepares flasks for, ascending
    pub fn levels(&self) -> BTreeSet<Decimal> {
        let plan = self.plan();
        let mut levels = BTreeSet::new();
        if plan.requires(TestSection::Linearity) {
            levels.extend(self.linearity.iter().map(|l| l.level_percent));
        }
        if plan.requires(TestSection::Accuracy) {
            levels.extend(self.accuracy.iter().map(|l| l.level_percent));
        }
        if plan.requires(TestSection::Sst) || plan.requires(TestSection::Precision) {
            levels.insert(Decimal::ONE_HUNDRED);
        }
        levels
    }

    /// Blank cells among the inputs of required sections
    pub fn blank_count(&self) -> usize {
        let plan = self.plan();
        let mut blanks = 0;
        let injection_blanks = |injs: &[Injection]| {
            injs.iter()
                .map(|i| {
                    usize::from(i.retention_time.is_none()) + usize::from(i.area.is_none())
                })
                .sum::<usize>()
        };
        if plan.requires(TestSection::Sst) {
            blanks += injection_blanks(&self.sst);
        }
        if plan.requires(TestSection::Specificity) {
            blanks += self.specificity.iter().filter(|s| s.area.is_none()).count();
        }
        if plan.requires(TestSection::Linearity) {
            blanks += count_blank_levels(&self.linearity);
        }
        if plan.requires(TestSection::Accuracy) {
            blanks += count_blank_levels(&self.accuracy);
        }
        if plan.requires(TestSection::Precision) {
            blanks += self.precision.repeatability.iter().filter(|v| v.is_none()).count();
            blanks += self.precision.intermediate.iter().filter(|v| v.is_none()).count();
        }
        if plan.requires(TestSection::LodLoq) {
            blanks += self
                .lod_loq
                .iter()
                .map(|s| usize::from(s.signal.is_none()) + usize::from(s.noise.is_none()))
                .sum::<usize>();
        }
        if plan.requires(TestSection::Robustness) {
            blanks += self
                .robustness
                .iter()
                .map(|c| injection_blanks(&c.injections))
                .sum::<usize>();
        }
        blanks
    }

    /// Domain checks on the values that are filled in
    pub fn check(&self) -> Vec<InputIssue> {
        let mut issues = Vec::new();
        let plan = self.plan();

        if self.method.target_concentration <= Decimal::ZERO {
            issues.push(InputIssue::error(
                "method.target_concentration",
                "target concentration must be positive",
            ));
        }

        let stock = &self.stock;
        if let Some(p) = stock.purity_percent {
            if p <= Decimal::ZERO || p > Decimal::ONE_HUNDRED {
                issues.push(InputIssue::error(
                    "stock.purity_percent",
                    format!("purity {}% is outside (0, 100]", p),
                ));
            }
        }
        if let Some(w) = stock.water_content_percent {
            if w < Decimal::ZERO || w >= Decimal::ONE_HUNDRED {
                issues.push(InputIssue::error(
                    "stock.water_content_percent",
                    format!("water content {}% is outside [0, 100)", w),
                ));
            }
        }
        for (field, value) in [
            ("stock.actual_weight_mg", stock.actual_weight_mg),
            ("stock.final_volume_ml", stock.final_volume_ml),
            ("stock.theoretical_stock", stock.theoretical_stock),
        ] {
            if value.is_some_and(|v| v <= Decimal::ZERO) {
                issues.push(InputIssue::error(field, "must be positive"));
            }
        }
        if stock.actual_weight_mg.is_none() || stock.final_volume_ml.is_none() {
            issues.push(InputIssue::warning(
                "stock",
                "weight or volume is blank; the actual stock concentration is indeterminate",
            ));
        }

        if plan.requires(TestSection::Sst) && self.sst.len() < 2 {
            issues.push(InputIssue::warning(
                "sst",
                format!(
                    "{} injection(s); at least 2 are needed for an RSD",
                    self.sst.len()
                ),
            ));
        }

        for (section, name, levels) in [
            (TestSection::Linearity, "linearity", &self.linearity),
            (TestSection::Accuracy, "accuracy", &self.accuracy),
        ] {
            if !plan.requires(section) {
                continue;
            }
            let mut seen = BTreeSet::new();
            for (i, level) in levels.iter().enumerate() {
                let field = format!("{}[{}]", name, i);
                if level.level_percent <= Decimal::ZERO {
                    issues.push(InputIssue::error(
                        field.clone(),
                        format!("level {}% must be positive", level.level_percent),
                    ));
                }
                if !seen.insert(level.level_percent) {
                    issues.push(InputIssue::warning(
                        field.clone(),
                        format!("level {}% appears more than once", level.level_percent),
                    ));
                }
                if level.responses.len() != LEVEL_REPLICATES {
                    issues.push(InputIssue::warning(
                        field,
                        format!(
                            "{} response(s); {} replicates expected",
                            level.responses.len(),
                            LEVEL_REPLICATES
                        ),
                    ));
                }
            }
        }

        if plan.requires(TestSection::Precision) {
            let sets = [
                ("precision.repeatability", &self.precision.repeatability, true),
                ("precision.intermediate", &self.precision.intermediate, false),
            ];
            for (field, values, mandatory) in sets {
                if (mandatory || !values.is_empty()) && values.len() != PRECISION_PREPARATIONS {
                    issues.push(InputIssue::warning(
                        field,
                        format!(
                            "{} preparation(s); {} expected",
                            values.len(),
                            PRECISION_PREPARATIONS
                        ),
                    ));
                }
            }
        }

        if plan.requires(TestSection::LodLoq) {
            for (i, inj) in self.lod_loq.iter().enumerate() {
                if inj.noise.is_some_and(|n| n <= Decimal::ZERO) {
                    issues.push(InputIssue::error(
                        format!("lod_loq[{}].noise", i),
                        "noise must be positive",
                    ));
                }
            }
        }

        for section in &plan.sections {
            if self.section_is_empty(*section) {
                issues.push(InputIssue::warning(
                    section.to_string(),
                    format!("{} is required but has no data", section.title()),
                ));
            }
        }

        let blanks = self.blank_count();
        if blanks > 0 {
            issues.push(InputIssue::warning(
                "*",
                format!("{} blank value(s); affected verdicts stay indeterminate", blanks),
            ));
        }

        issues
    }

    fn section_is_empty(&self, section: TestSection) -> bool {
        match section {
            TestSection::Sst => self.sst.is_empty(),
            TestSection::Specificity => self.specificity.is_empty(),
            TestSection::Linearity => self.linearity.is_empty(),
            TestSection::Accuracy => self.accuracy.is_empty(),
            TestSection::Precision => self.precision.repeatability.is_empty(),
            TestSection::LodLoq => self.lod_loq.is_empty(),
            TestSection::Robustness => self.robustness.is_empty(),
        }
    }
}

fn count_blank_levels(levels: &[LevelResponses]) -> usize {
    levels
        .iter()
        .map(|l| l.responses.iter().filter(|r| r.is_none()).count())
        .sum()
}
