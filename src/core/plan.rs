//! Which test sections a method has to go through
//!
//! The test category of a method decides the ICH Q2 validation
//! characteristics it needs. An explicit list on the method overrides the
//! category default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A section of the validation logbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSection {
    #[serde(alias = "system_suitability")]
    Sst,
    Specificity,
    Linearity,
    Accuracy,
    Precision,
    #[serde(alias = "lod", alias = "loq")]
    LodLoq,
    Robustness,
}

impl TestSection {
    /// All sections in logbook order
    pub fn all() -> &'static [TestSection] {
        &[
            TestSection::Sst,
            TestSection::Specificity,
            TestSection::Linearity,
            TestSection::Accuracy,
            TestSection::Precision,
            TestSection::LodLoq,
            TestSection::Robustness,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            TestSection::Sst => "System Suitability",
            TestSection::Specificity => "Specificity",
            TestSection::Linearity => "Linearity",
            TestSection::Accuracy => "Accuracy",
            TestSection::Precision => "Precision",
            TestSection::LodLoq => "LOD / LOQ",
            TestSection::Robustness => "Robustness",
        }
    }
}

impl std::fmt::Display for TestSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestSection::Sst => write!(f, "sst"),
            TestSection::Specificity => write!(f, "specificity"),
            TestSection::Linearity => write!(f, "linearity"),
            TestSection::Accuracy => write!(f, "accuracy"),
            TestSection::Precision => write!(f, "precision"),
            TestSection::LodLoq => write!(f, "lod_loq"),
            TestSection::Robustness => write!(f, "robustness"),
        }
    }
}

impl std::str::FromStr for TestSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sst" | "system_suitability" => Ok(TestSection::Sst),
            "specificity" => Ok(TestSection::Specificity),
            "linearity" => Ok(TestSection::Linearity),
            "accuracy" => Ok(TestSection::Accuracy),
            "precision" => Ok(TestSection::Precision),
            "lod_loq" | "lod" | "loq" => Ok(TestSection::LodLoq),
            "robustness" => Ok(TestSection::Robustness),
            _ => Err(format!("Unknown test section: {}", s)),
        }
    }
}

/// Test category of an analytical procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodCategory {
    /// Identification test
    Identification,
    /// Assay / content / potency
    Assay,
    /// Quantitative impurity test
    ImpurityQuantitative,
    /// Limit test for impurities
    ImpurityLimit,
}

impl MethodCategory {
    /// Sections required for this category
    pub fn required_sections(&self) -> BTreeSet<TestSection> {
        use TestSection::*;
        let sections: &[TestSection] = match self {
            MethodCategory::Identification => &[Sst, Specificity],
            MethodCategory::Assay => &[Sst, Specificity, Linearity, Accuracy, Precision, Robustness],
            MethodCategory::ImpurityQuantitative => &[
                Sst,
                Specificity,
                Linearity,
                Accuracy,
                Precision,
                LodLoq,
                Robustness,
            ],
            MethodCategory::ImpurityLimit => &[Sst, Specificity, LodLoq],
        };
        sections.iter().copied().collect()
    }
}

impl std::fmt::Display for MethodCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodCategory::Identification => write!(f, "identification"),
            MethodCategory::Assay => write!(f, "assay"),
            MethodCategory::ImpurityQuantitative => write!(f, "impurity_quantitative"),
            MethodCategory::ImpurityLimit => write!(f, "impurity_limit"),
        }
    }
}

impl std::str::FromStr for MethodCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "identification" | "id" => Ok(MethodCategory::Identification),
            "assay" => Ok(MethodCategory::Assay),
            "impurity_quantitative" => Ok(MethodCategory::ImpurityQuantitative),
            "impurity_limit" => Ok(MethodCategory::ImpurityLimit),
            _ => Err(format!("Unknown method category: {}", s)),
        }
    }
}

/// Resolved set of sections to evaluate for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPlan {
    pub sections: BTreeSet<TestSection>,
}

impl ValidationPlan {
    /// Explicit items win over the category; with neither, every section runs
    pub fn resolve(category: Option<MethodCategory>, required_items: &[TestSection]) -> Self {
        let sections = if !required_items.is_empty() {
            required_items.iter().copied().collect()
        } else if let Some(category) = category {
            category.required_sections()
        } else {
            TestSection::all().iter().copied().collect()
        };
        Self { sections }
    }

    pub fn requires(&self, section: TestSection) -> bool {
        self.sections.contains(&section)
    }
}
