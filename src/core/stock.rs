//! Stock solution correction (purity / water content / weighing)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::rounding::{truncate, CONC_DIGITS};

/// Raw weighing data for a stock solution; every field may still be blank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPreparation {
    /// Nominal stock concentration the preparation aims for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theoretical_stock: Option<Decimal>,

    /// Reference standard purity in percent (blank = 100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purity_percent: Option<Decimal>,

    /// Water content in percent (blank = 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_content_percent: Option<Decimal>,

    /// Weighed amount in mg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_weight_mg: Option<Decimal>,

    /// Volumetric flask volume in mL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_volume_ml: Option<Decimal>,
}

/// Derived stock figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCorrection {
    /// Corrected stock concentration, blank until weight and volume are known
    pub actual_stock_conc: Option<Decimal>,

    /// actual / theoretical, `1` when no theoretical stock is given
    pub correction_factor: Option<Decimal>,
}

impl StockPreparation {
    /// Compute the corrected stock concentration and correction factor
    ///
    /// ```text
    /// actual = trunc(weight × purity/100 × (100 − water)/100 / volume, 4)
    /// factor = trunc(actual / theoretical, 4)
    /// ```
    pub fn correct(&self) -> StockCorrection {
        let actual_stock_conc = self.actual_stock_conc();

        let correction_factor = match self.theoretical_stock {
            Some(theoretical) if !theoretical.is_zero() => actual_stock_conc
                .and_then(|actual| actual.checked_div(theoretical))
                .map(|f| truncate(f, CONC_DIGITS)),
            _ => Some(truncate(Decimal::ONE, CONC_DIGITS)),
        };

        StockCorrection {
            actual_stock_conc,
            correction_factor,
        }
    }

    /// Stock concentration the dilutions are planned against
    ///
    /// The weighed stock once it is known, the nominal one before that.
    pub fn planning_conc(&self) -> Option<Decimal> {
        self.actual_stock_conc().or(self.theoretical_stock)
    }

    fn actual_stock_conc(&self) -> Option<Decimal> {
        let weight = self.actual_weight_mg?;
        let volume = self.final_volume_ml?;
        if volume.is_zero() {
            return None;
        }
        let purity = self.purity_percent.unwrap_or(Decimal::ONE_HUNDRED);
        let water = self.water_content_percent.unwrap_or(Decimal::ZERO);

        let purity_fraction = purity.checked_div(Decimal::ONE_HUNDRED)?;
        let dry_fraction = Decimal::ONE_HUNDRED
            .checked_sub(water)?
            .checked_div(Decimal::ONE_HUNDRED)?;

        let conc = weight
            .checked_mul(purity_fraction)?
            .checked_mul(dry_fraction)?
            .checked_div(volume)?;
        Some(truncate(conc, CONC_DIGITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use rust_decimal_macros::dec;

    fn prep(weight: Decimal, purity: Decimal, water: Decimal, volume: Decimal) -> StockPreparation {
        StockPreparation {
            theoretical_stock: None,
            purity_percent: Some(purity),
            water_content_percent: Some(water),
            actual_weight_mg: Some(weight),
            final_volume_ml: Some(volume),
        }
    }

    #[test]
    fn test_actual_stock_conc() {
        // 50.37 mg × 0.995 × 0.998 / 10 mL = 5.00179137 → 5.0017
        let c = prep(dec!(50.37), dec!(99.5), dec!(0.2), dec!(10)).correct();
        assert_eq!(c.actual_stock_conc, Some(dec!(5.0017)));
        assert_eq!(c.correction_factor, Some(dec!(1.0000)));
    }

    #[test]
    fn test_defaults_for_purity_and_water() {
        let p = StockPreparation {
            actual_weight_mg: Some(dec!(25)),
            final_volume_ml: Some(dec!(50)),
            ..Default::default()
        };
        assert_eq!(p.correct().actual_stock_conc, Some(dec!(0.5)));
    }

    #[test]
    fn test_blank_weight_or_volume_is_indeterminate() {
        let mut p = prep(dec!(50), dec!(100), dec!(0), dec!(10));
        p.actual_weight_mg = None;
        assert_eq!(p.correct().actual_stock_conc, None);

        let mut p = prep(dec!(50), dec!(100), dec!(0), dec!(10));
        p.final_volume_ml = None;
        assert_eq!(p.correct().actual_stock_conc, None);

        let p = prep(dec!(50), dec!(100), dec!(0), dec!(0));
        assert_eq!(p.correct().actual_stock_conc, None);
    }

    #[test]
    fn test_correction_factor() {
        let mut p = prep(dec!(49.80), dec!(100), dec!(0), dec!(10));
        p.theoretical_stock = Some(dec!(5.0));
        let c = p.correct();
        assert_eq!(c.actual_stock_conc, Some(dec!(4.98)));
        assert_eq!(c.correction_factor, Some(dec!(0.996)));
    }

    #[test]
    fn test_correction_factor_defaults_to_one() {
        let mut p = prep(dec!(49.80), dec!(100), dec!(0), dec!(10));
        p.theoretical_stock = Some(Decimal::ZERO);
        assert_eq!(p.correct().correction_factor, Some(dec!(1)));
        p.theoretical_stock = None;
        assert_eq!(p.correct().correction_factor, Some(dec!(1)));
    }

    #[test]
    fn test_correction_factor_blank_when_stock_blank() {
        let p = StockPreparation {
            theoretical_stock: Some(dec!(5)),
            ..Default::default()
        };
        assert_eq!(p.correct().correction_factor, None);
    }

    #[test]
    fn test_planning_prefers_weighed_stock() {
        let mut p = prep(dec!(55), dec!(100), dec!(0), dec!(50));
        p.theoretical_stock = Some(dec!(1.2));
        assert_eq!(p.planning_conc(), Some(dec!(1.1)));

        p.actual_weight_mg = None;
        assert_eq!(p.planning_conc(), Some(dec!(1.2)));

        p.theoretical_stock = None;
        assert_eq!(p.planning_conc(), None);
    }

    #[test]
    fn test_randomized_against_float_reference() {
        let mut rng = rand::rng();
        for _ in 0..500 {
            let weight = Decimal::from_f64(rng.random_range(1.0..200.0)).unwrap().round_dp(2);
            let purity = Decimal::from_f64(rng.random_range(90.0..100.0)).unwrap().round_dp(2);
            let water = Decimal::from_f64(rng.random_range(0.0..10.0)).unwrap().round_dp(2);
            let volume = Decimal::from_f64(rng.random_range(5.0..100.0)).unwrap().round_dp(1);

            let got = prep(weight, purity, water, volume)
                .correct()
                .actual_stock_conc
                .unwrap()
                .to_f64()
                .unwrap();

            let reference = weight.to_f64().unwrap()
                * (purity.to_f64().unwrap() / 100.0)
                * ((100.0 - water.to_f64().unwrap()) / 100.0)
                / volume.to_f64().unwrap();
            let reference = (reference * 10_000.0).trunc() / 10_000.0;

            // Float truncation can land one unit below the exact decimal result
            assert!(
                (got - reference).abs() <= 0.000_100_1,
                "weight={weight} purity={purity} water={water} volume={volume}: {got} vs {reference}"
            );
        }
    }
}
