//! Method parameters entered once per validation run

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::plan::{MethodCategory, TestSection, ValidationPlan};

/// Instrument, column and detection descriptors plus the target concentration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameters {
    /// Method name or code
    pub name: String,

    #[serde(default)]
    pub instrument: String,

    #[serde(default)]
    pub column: String,

    #[serde(default)]
    pub detection: String,

    /// 100 % level concentration
    pub target_concentration: Decimal,

    /// Concentration unit (e.g. "mg/mL")
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Analytical technique (e.g. "HPLC")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,

    /// Development phase (e.g. "Phase 1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MethodCategory>,

    /// Explicit list of sections; overrides `category`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_items: Vec<TestSection>,

    /// Acceptance criterion wording as written in the protocol, by section
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub criteria_texts: BTreeMap<String, String>,
}

fn default_unit() -> String {
    "mg/mL".to_string()
}

impl MethodParameters {
    pub fn new(name: impl Into<String>, target_concentration: Decimal) -> Self {
        Self {
            name: name.into(),
            instrument: String::new(),
            column: String::new(),
            detection: String::new(),
            target_concentration,
            unit: default_unit(),
            modality: None,
            phase: None,
            category: None,
            required_items: Vec::new(),
            criteria_texts: BTreeMap::new(),
        }
    }

    /// Sections this method has to be validated for
    pub fn plan(&self) -> ValidationPlan {
        ValidationPlan::resolve(self.category, &self.required_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minimal_yaml() {
        let method: MethodParameters =
            serde_yml::from_str("name: ASSAY-01\ntarget_concentration: 0.5\n").unwrap();
        assert_eq!(method.target_concentration, dec!(0.5));
        assert_eq!(method.unit, "mg/mL");
        assert_eq!(method.plan().sections.len(), TestSection::all().len());
    }

    #[test]
    fn test_category_drives_plan() {
        let method: MethodParameters = serde_yml::from_str(
            "name: ID-01\ntarget_concentration: 1\ncategory: identification\n",
        )
        .unwrap();
        let plan = method.plan();
        assert!(plan.requires(TestSection::Specificity));
        assert!(!plan.requires(TestSection::Linearity));
    }

    #[test]
    fn test_required_items_override_category() {
        let mut method = MethodParameters::new("IMP-01", dec!(0.001));
        method.category = Some(MethodCategory::Assay);
        method.required_items = vec![TestSection::LodLoq];
        let plan = method.plan();
        assert!(plan.requires(TestSection::LodLoq));
        assert!(!plan.requires(TestSection::Accuracy));
    }
}
