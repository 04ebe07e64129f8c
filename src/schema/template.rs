//! Template generation for blank input snapshots

use chrono::{DateTime, Local};
use miette::Diagnostic;
use rust_decimal::Decimal;
use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::core::config::RecipeConfig;
use crate::core::plan::MethodCategory;
use crate::entities::inputs::{LEVEL_REPLICATES, PRECISION_PREPARATIONS};
use crate::entities::sensitivity::LimitRole;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const INPUTS_TEMPLATE: &str = "inputs.yaml.tera";

/// Injections prepared for system suitability and each robustness condition
const SST_INJECTIONS: usize = 6;

/// Unmodified method first, then flow and column temperature varied both ways
const ROBUSTNESS_CONDITIONS: [&str; 5] = [
    "Standard",
    "Flow +0.1 mL/min",
    "Flow -0.1 mL/min",
    "Column temperature +5 C",
    "Column temperature -5 C",
];

/// One low-level injection seeded in the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensitivitySeed {
    pub level: Decimal,
    pub role: Option<LimitRole>,
}

/// Lowest level demonstrates the LOD, the rest the LOQ; a lone level is judged on both
fn sensitivity_seeds(levels: &[Decimal]) -> Vec<SensitivitySeed> {
    let lowest = levels.iter().min().copied();
    levels
        .iter()
        .map(|&level| SensitivitySeed {
            level,
            role: match (levels.len(), Some(level) == lowest) {
                (0 | 1, _) => None,
                (_, true) => Some(LimitRole::Lod),
                (_, false) => Some(LimitRole::Loq),
            },
        })
        .collect()
}

/// Context for template generation
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub method_name: String,
    pub target_concentration: Decimal,
    pub unit: String,
    pub category: Option<MethodCategory>,
    pub created: DateTime<Local>,
    pub linearity_levels: Vec<Decimal>,
    pub accuracy_levels: Vec<Decimal>,
    pub lod_loq: Vec<SensitivitySeed>,
}

impl TemplateContext {
    /// Levels are taken from the configured recipe sets
    pub fn new(
        method_name: impl Into<String>,
        target_concentration: Decimal,
        recipe: &RecipeConfig,
    ) -> Self {
        let levels = |name: &str| recipe.levels(name).map(<[Decimal]>::to_vec).unwrap_or_default();
        Self {
            method_name: method_name.into(),
            target_concentration,
            unit: "mg/mL".to_string(),
            category: None,
            created: Local::now(),
            linearity_levels: levels("linearity"),
            accuracy_levels: levels("accuracy"),
            lod_loq: sensitivity_seeds(&levels("lod_loq")),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_category(mut self, category: MethodCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Template generator using Tera
pub struct TemplateGenerator {
    tera: Tera,
}

#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    #[diagnostic(code(amv::template::missing))]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    #[diagnostic(code(amv::template::render))]
    RenderError(String),
}

fn blank_list(len: usize) -> String {
    format!("[{}]", vec!["~"; len].join(", "))
}

/// Double-quoted YAML scalar; JSON string syntax is valid YAML
fn quoted(value: &str) -> Result<String, TemplateError> {
    serde_json::to_string(value).map_err(|e| TemplateError::RenderError(e.to_string()))
}

impl TemplateGenerator {
    /// Create a new template generator with embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Generate a blank input snapshot
    pub fn generate_inputs(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == INPUTS_TEMPLATE) {
            return Err(TemplateError::NotFound(INPUTS_TEMPLATE.to_string()));
        }

        let mut context = tera::Context::new();
        context.insert("method_title", &ctx.method_name.replace(['\r', '\n'], " "));
        context.insert("method_name", &quoted(&ctx.method_name)?);
        context.insert("target_concentration", &ctx.target_concentration);
        context.insert("unit", &quoted(&ctx.unit)?);
        context.insert(
            "category",
            &ctx.category.map(|c| c.to_string()).unwrap_or_default(),
        );
        context.insert("created_date", &ctx.created.format("%Y-%m-%d").to_string());
        context.insert("linearity_levels", &ctx.linearity_levels);
        context.insert("accuracy_levels", &ctx.accuracy_levels);
        context.insert("lod_loq", &ctx.lod_loq);
        context.insert("robustness_conditions", &ROBUSTNESS_CONDITIONS);
        context.insert("blank_replicates", &blank_list(LEVEL_REPLICATES));
        context.insert("blank_preparations", &blank_list(PRECISION_PREPARATIONS));
        context.insert("sst_injections", &SST_INJECTIONS);

        self.tera
            .render(INPUTS_TEMPLATE, &context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::inputs::ValidationInputs;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rendered_template_parses() {
        let recipe = RecipeConfig::default();
        let ctx = TemplateContext::new("ASSAY-01", dec!(0.5), &recipe)
            .with_category(MethodCategory::Assay);
        let yaml = TemplateGenerator::new().unwrap().generate_inputs(&ctx).unwrap();

        let inputs: ValidationInputs = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(inputs.method.name, "ASSAY-01");
        assert_eq!(inputs.method.target_concentration, dec!(0.5));
        assert_eq!(inputs.method.category, Some(MethodCategory::Assay));
        assert_eq!(inputs.linearity.len(), 5);
        assert_eq!(inputs.linearity[0].responses, vec![None, None, None]);
        assert_eq!(inputs.accuracy.len(), 3);
        assert_eq!(inputs.precision.repeatability.len(), 6);
        assert_eq!(inputs.sst.len(), 6);
        assert_eq!(inputs.lod_loq.len(), 2);
        assert_eq!(inputs.lod_loq[0].role, Some(LimitRole::Lod));
        assert_eq!(inputs.lod_loq[1].role, Some(LimitRole::Loq));
        assert_eq!(inputs.stock.actual_weight_mg, None);

        let conditions: Vec<&str> =
            inputs.robustness.iter().map(|c| c.condition.as_str()).collect();
        assert_eq!(conditions, ROBUSTNESS_CONDITIONS);
        assert!(inputs.robustness.iter().all(|c| c.injections.len() == 6));
    }

    #[test]
    fn test_quotes_in_names_are_escaped() {
        let ctx = TemplateContext::new("A\"B: 'C'", dec!(0.5), &RecipeConfig::default())
            .with_unit("µg/mL \"w/v\"");
        let yaml = TemplateGenerator::new().unwrap().generate_inputs(&ctx).unwrap();
        let inputs: ValidationInputs = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(inputs.method.name, "A\"B: 'C'");
        assert_eq!(inputs.method.unit, "µg/mL \"w/v\"");
    }

    #[test]
    fn test_sensitivity_roles() {
        assert!(sensitivity_seeds(&[]).is_empty());
        assert_eq!(sensitivity_seeds(&[dec!(2)])[0].role, None);
        let seeds = sensitivity_seeds(&[dec!(3), dec!(1), dec!(5)]);
        let roles: Vec<_> = seeds.iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![Some(LimitRole::Loq), Some(LimitRole::Lod), Some(LimitRole::Loq)]
        );
    }

    #[test]
    fn test_levels_follow_config() {
        let recipe = RecipeConfig {
            total_volume_ml: dec!(10),
            sets: vec![crate::core::dilution::RecipeSet::new(
                "linearity",
                vec![dec!(50), dec!(150)],
                3,
            )],
        };
        let ctx = TemplateContext::new("X", dec!(1), &recipe);
        let yaml = TemplateGenerator::new().unwrap().generate_inputs(&ctx).unwrap();
        let inputs: ValidationInputs = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(inputs.linearity.len(), 2);
        assert!(inputs.accuracy.is_empty());
    }
}
