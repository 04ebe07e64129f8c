//! Dilution recipes and master material planning
//!
//! A recipe tells the technician how much stock and diluent go into each
//! volumetric flask. A level whose target exceeds the stock concentration has
//! no physical recipe and is reported as [`StockInsufficientError`]; no row is
//! produced for it.

use miette::Diagnostic;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::ConcentrationBasis;
use crate::core::rounding::{truncate, CONC_DIGITS, VOLUME_DIGITS};

/// One flask of a dilution series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DilutionLevel {
    /// Level relative to the method target concentration (e.g. 80, 100, 120)
    pub level_percent: Decimal,

    /// Concentration this flask should contain
    pub target_conc: Decimal,

    /// Stock solution to pipette (mL)
    pub stock_volume_ml: Decimal,

    /// Diluent to add (mL)
    pub diluent_volume_ml: Decimal,

    /// Flask volume (mL); always stock + diluent
    pub total_volume_ml: Decimal,
}

/// The stock is too weak for a requested level
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic, Serialize)]
#[error(
    "stock concentration {stock_conc} is below the {level_percent}% level target of {required_conc}"
)]
#[diagnostic(
    code(amv::dilution::stock_insufficient),
    help("prepare a more concentrated stock or correct the weighing; no recipe is produced for this level")
)]
pub struct StockInsufficientError {
    /// Level that cannot be prepared
    pub level_percent: Decimal,

    /// Concentration the level needs
    pub required_conc: Decimal,

    /// Concentration of the available stock
    pub stock_conc: Decimal,
}

/// Errors that block recipe generation
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DilutionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    StockInsufficient(#[from] StockInsufficientError),

    #[error("flask volume must be positive, got {total_volume_ml} mL")]
    #[diagnostic(code(amv::dilution::volume), help("set recipe.total_volume_ml to the flask size"))]
    NonPositiveVolume { total_volume_ml: Decimal },

    #[error("level {level_percent}% gives a negative target concentration")]
    #[diagnostic(code(amv::dilution::level))]
    NegativeTarget { level_percent: Decimal },
}

/// Compute the recipe for a single level
///
/// ```text
/// target  = trunc(target_conc × level / 100, 4)
/// stock   = trunc(target × total / stock_conc, 3)
/// diluent = total − stock
/// ```
pub fn plan_level(
    target_conc: Decimal,
    level_percent: Decimal,
    stock_conc: Decimal,
    total_volume_ml: Decimal,
) -> Result<DilutionLevel, DilutionError> {
    if total_volume_ml <= Decimal::ZERO {
        return Err(DilutionError::NonPositiveVolume { total_volume_ml });
    }

    let target = target_conc * level_percent / Decimal::ONE_HUNDRED;
    let target = truncate(target, CONC_DIGITS);
    if target < Decimal::ZERO {
        return Err(DilutionError::NegativeTarget { level_percent });
    }

    if stock_conc < target {
        return Err(StockInsufficientError {
            level_percent,
            required_conc: target,
            stock_conc,
        }
        .into());
    }

    let stock_volume = if target.is_zero() {
        truncate(Decimal::ZERO, VOLUME_DIGITS)
    } else {
        // stock_conc >= target > 0 here
        truncate(target * total_volume_ml / stock_conc, VOLUME_DIGITS)
    };
    let diluent_volume = total_volume_ml - stock_volume;

    Ok(DilutionLevel {
        level_percent,
        target_conc: target,
        stock_volume_ml: stock_volume,
        diluent_volume_ml: diluent_volume,
        total_volume_ml,
    })
}

/// Compute recipes for every requested level
///
/// Stops at the first level that cannot be prepared.
pub fn plan(
    target_conc: Decimal,
    levels: &[Decimal],
    stock_conc: Decimal,
    total_volume_ml: Decimal,
) -> Result<Vec<DilutionLevel>, DilutionError> {
    levels
        .iter()
        .map(|level| plan_level(target_conc, *level, stock_conc, total_volume_ml))
        .collect()
}

/// A named group of flasks prepared for one test section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSet {
    /// Test section name (linearity, accuracy, ...)
    pub name: String,

    /// Levels in percent of the target concentration
    pub levels: Vec<Decimal>,

    /// Independent preparations per level
    #[serde(default = "default_preparations")]
    pub preparations: u32,

    /// Flask volume for this set; falls back to the global default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume_ml: Option<Decimal>,
}

fn default_preparations() -> u32 {
    1
}

impl RecipeSet {
    pub fn new(name: impl Into<String>, levels: Vec<Decimal>, preparations: u32) -> Self {
        Self {
            name: name.into(),
            levels,
            preparations,
            total_volume_ml: None,
        }
    }
}

/// Planned recipes for one set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPlan {
    pub name: String,
    pub preparations: u32,
    pub levels: Vec<DilutionLevel>,

    /// Σ stock volume × preparations (mL)
    pub stock_consumption_ml: Decimal,
}

/// Master recipe: all sets plus total stock consumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialPlan {
    pub target_conc: Decimal,
    pub stock_conc: Decimal,
    pub sets: Vec<SetPlan>,

    /// Stock needed across all sets (mL)
    pub total_stock_ml: Decimal,

    /// Prepared stock volume, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_stock_ml: Option<Decimal>,

    /// Whether the prepared stock covers the whole plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sufficient_volume: Option<bool>,
}

/// Plan every recipe set against one stock solution
pub fn plan_materials(
    target_conc: Decimal,
    stock_conc: Decimal,
    default_total_volume_ml: Decimal,
    sets: &[RecipeSet],
    available_stock_ml: Option<Decimal>,
) -> Result<MaterialPlan, DilutionError> {
    let mut planned = Vec::with_capacity(sets.len());
    let mut total_stock = Decimal::ZERO;

    for set in sets {
        let volume = set.total_volume_ml.unwrap_or(default_total_volume_ml);
        let levels = plan(target_conc, &set.levels, stock_conc, volume)?;
        let per_prep: Decimal = levels.iter().map(|l| l.stock_volume_ml).sum();
        let consumption = per_prep * Decimal::from(set.preparations);
        total_stock += consumption;

        tracing::debug!(
            set = %set.name,
            levels = levels.len(),
            consumption_ml = %consumption,
            "planned recipe set"
        );

        planned.push(SetPlan {
            name: set.name.clone(),
            preparations: set.preparations,
            levels,
            stock_consumption_ml: consumption,
        });
    }

    Ok(MaterialPlan {
        target_conc,
        stock_conc,
        sets: planned,
        total_stock_ml: total_stock,
        available_stock_ml,
        sufficient_volume: available_stock_ml.map(|available| total_stock <= available),
    })
}

/// Maps a level to the theoretical concentration of its flask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcentrationScale {
    pub target_conc: Decimal,
    pub correction_factor: Option<Decimal>,
    pub basis: ConcentrationBasis,
}

impl ConcentrationScale {
    pub fn new(
        target_conc: Decimal,
        correction_factor: Option<Decimal>,
        basis: ConcentrationBasis,
    ) -> Self {
        Self {
            target_conc,
            correction_factor,
            basis,
        }
    }

    /// Nominal level concentration, `trunc(target × level / 100, 4)`
    pub fn nominal(&self, level_percent: Decimal) -> Option<Decimal> {
        let conc = self
            .target_conc
            .checked_mul(level_percent)?
            .checked_div(Decimal::ONE_HUNDRED)?;
        Some(truncate(conc, CONC_DIGITS))
    }

    /// Theoretical concentration under the configured basis
    ///
    /// On the corrected basis the nominal value is scaled by the stock
    /// correction factor and stays blank until that factor is known.
    pub fn theoretical(&self, level_percent: Decimal) -> Option<Decimal> {
        let nominal = self.nominal(level_percent)?;
        match self.basis {
            ConcentrationBasis::Nominal => Some(nominal),
            ConcentrationBasis::Corrected => {
                let factor = self.correction_factor?;
                Some(truncate(nominal.checked_mul(factor)?, CONC_DIGITS))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_worked_recipe_100_percent() {
        let level = plan_level(dec!(1.000), dec!(100), dec!(5.000), dec!(10)).unwrap();
        assert_eq!(level.stock_volume_ml, dec!(2.000));
        assert_eq!(level.diluent_volume_ml, dec!(8.000));
        assert_eq!(level.target_conc, dec!(1.0000));
    }

    #[test]
    fn test_stock_insufficient_at_120() {
        let err = plan_level(dec!(1.0), dec!(120), dec!(1.0), dec!(10)).unwrap_err();
        match err {
            DilutionError::StockInsufficient(e) => {
                assert_eq!(e.level_percent, dec!(120));
                assert_eq!(e.required_conc, dec!(1.2));
                assert_eq!(e.stock_conc, dec!(1.0));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_produces_no_rows_when_any_level_fails() {
        let levels = [dec!(80), dec!(100), dec!(120)];
        let result = plan(dec!(1.0), &levels, dec!(1.0), dec!(10));
        assert!(matches!(result, Err(DilutionError::StockInsufficient(_))));
    }

    #[test]
    fn test_volumes_sum_to_total() {
        let levels = [dec!(80), dec!(90), dec!(100), dec!(110), dec!(120)];
        for stock in [dec!(3.3333), dec!(5.0017), dec!(1.2), dec!(7.77)] {
            for total in [dec!(10), dec!(25), dec!(50), dec!(100)] {
                let recipes = plan(dec!(1.0), &levels, stock, total).unwrap();
                for r in recipes {
                    assert_eq!(r.stock_volume_ml + r.diluent_volume_ml, r.total_volume_ml);
                    assert!(r.diluent_volume_ml >= Decimal::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_stock_equal_to_target_needs_no_diluent() {
        let r = plan_level(dec!(1.0), dec!(100), dec!(1.0), dec!(10)).unwrap();
        assert_eq!(r.stock_volume_ml, dec!(10));
        assert_eq!(r.diluent_volume_ml, dec!(0));
    }

    #[test]
    fn test_non_positive_volume_rejected() {
        let err = plan_level(dec!(1.0), dec!(100), dec!(5.0), dec!(0)).unwrap_err();
        assert!(matches!(err, DilutionError::NonPositiveVolume { .. }));
    }

    #[test]
    fn test_material_plan_totals() {
        let sets = vec![
            RecipeSet::new("linearity", vec![dec!(80), dec!(100), dec!(120)], 1),
            RecipeSet::new("precision", vec![dec!(100)], 6),
        ];
        let plan = plan_materials(dec!(1.0), dec!(5.0), dec!(10), &sets, Some(dec!(20))).unwrap();
        // linearity: 1.6 + 2.0 + 2.4 = 6.0; precision: 2.0 × 6 = 12.0
        assert_eq!(plan.sets[0].stock_consumption_ml, dec!(6.0));
        assert_eq!(plan.sets[1].stock_consumption_ml, dec!(12.0));
        assert_eq!(plan.total_stock_ml, dec!(18.0));
        assert_eq!(plan.sufficient_volume, Some(true));
    }

    #[test]
    fn test_material_plan_flags_short_stock() {
        let sets = vec![RecipeSet::new("precision", vec![dec!(100)], 12)];
        let plan = plan_materials(dec!(1.0), dec!(5.0), dec!(10), &sets, Some(dec!(10))).unwrap();
        assert_eq!(plan.sufficient_volume, Some(false));
    }

    #[test]
    fn test_material_plan_uses_set_volume() {
        let mut set = RecipeSet::new("sst", vec![dec!(100)], 1);
        set.total_volume_ml = Some(dec!(50));
        let plan = plan_materials(dec!(1.0), dec!(5.0), dec!(10), &[set], None).unwrap();
        assert_eq!(plan.sets[0].levels[0].stock_volume_ml, dec!(10.000));
        assert_eq!(plan.sufficient_volume, None);
    }

    #[test]
    fn test_concentration_scale_basis() {
        let corrected =
            ConcentrationScale::new(dec!(0.5), Some(dec!(1.0036)), ConcentrationBasis::Corrected);
        assert_eq!(corrected.nominal(dec!(80)), Some(dec!(0.4)));
        assert_eq!(corrected.theoretical(dec!(80)), Some(dec!(0.4014)));

        let nominal = ConcentrationScale { basis: ConcentrationBasis::Nominal, ..corrected };
        assert_eq!(nominal.theoretical(dec!(80)), Some(dec!(0.4)));

        let unknown = ConcentrationScale::new(dec!(0.5), None, ConcentrationBasis::Corrected);
        assert_eq!(unknown.theoretical(dec!(100)), None);
    }
}
