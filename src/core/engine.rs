//! Validation engine
//!
//! One call to [`ValidationEngine::evaluate`] recomputes the whole dataset
//! from the input snapshot. Nothing is cached between calls and no I/O
//! happens here.

use miette::Diagnostic;
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::config::{ConcentrationBasis, Config};
use crate::core::dilution::{self, ConcentrationScale, DilutionError};
use crate::core::plan::TestSection;
use crate::entities::accuracy::AccuracyResult;
use crate::entities::dataset::{DatasetSummary, ValidationDataset};
use crate::entities::inputs::ValidationInputs;
use crate::entities::linearity::LinearityResult;
use crate::entities::precision::PrecisionResult;
use crate::entities::robustness::RobustnessResult;
use crate::entities::sensitivity::SensitivityResult;
use crate::entities::specificity::SpecificityResult;
use crate::entities::sst::SstResult;

/// Errors that stop an evaluation
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Recipe(#[from] DilutionError),

    #[error("cannot fingerprint input snapshot: {0}")]
    #[diagnostic(code(amv::engine::digest))]
    Digest(#[from] serde_json::Error),
}

/// Everything that determines the dataset besides the inputs themselves
#[derive(Serialize)]
struct DigestPayload<'a> {
    inputs: &'a ValidationInputs,
    concentration_basis: ConcentrationBasis,
    intermediate_max_difference_percent: Option<Decimal>,
    total_volume_ml: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    config: Config,
}

impl ValidationEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// SHA-256 (hex) of the canonical JSON form of inputs and policy
    pub fn input_digest(&self, inputs: &ValidationInputs) -> Result<String, EngineError> {
        let payload = DigestPayload {
            inputs,
            concentration_basis: self.config.concentration_basis,
            intermediate_max_difference_percent: self
                .config
                .precision
                .intermediate_max_difference_percent,
            total_volume_ml: self.config.recipe.total_volume_ml,
        };
        let bytes = serde_json::to_vec(&payload)?;
        let hash = Sha256::digest(&bytes);
        Ok(hash.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Derive every value and verdict for one input snapshot
    ///
    /// Blank inputs give indeterminate records. A level the stock cannot
    /// supply is an error and no dataset is produced.
    pub fn evaluate(&self, inputs: &ValidationInputs) -> Result<ValidationDataset, EngineError> {
        let plan = inputs.plan();
        let method = &inputs.method;
        let input_digest = self.input_digest(inputs)?;

        let stock = inputs.stock.correct();
        tracing::debug!(
            actual_stock_conc = ?stock.actual_stock_conc,
            correction_factor = ?stock.correction_factor,
            "stock correction"
        );

        let mut levels = inputs.levels();
        if plan.requires(TestSection::LodLoq) {
            if let Some(sensitivity) = self.config.recipe.levels("lod_loq") {
                levels.extend(sensitivity.iter().copied());
            }
        }
        let levels: Vec<Decimal> = levels.into_iter().collect();

        let planned_stock = inputs.stock.planning_conc();
        if stock.actual_stock_conc.is_none() && planned_stock.is_some() {
            tracing::debug!("stock not weighed yet, planning against the nominal stock");
        }
        let recipes = match planned_stock {
            Some(stock_conc) => dilution::plan(
                method.target_concentration,
                &levels,
                stock_conc,
                self.config.recipe.total_volume_ml,
            )
            .inspect_err(|e| tracing::warn!("recipe planning failed: {}", e))?,
            None => {
                tracing::debug!("no stock concentration yet, recipes skipped");
                Vec::new()
            }
        };

        let scale = ConcentrationScale::new(
            method.target_concentration,
            stock.correction_factor,
            self.config.concentration_basis,
        );

        // SST feeds the specificity reference area even when not reported
        let sst = SstResult::evaluate(&inputs.sst);

        let specificity = plan
            .requires(TestSection::Specificity)
            .then(|| SpecificityResult::evaluate(&inputs.specificity, sst.mean_area()));

        let calibration = (plan.requires(TestSection::Linearity)
            || plan.requires(TestSection::Accuracy))
        .then(|| LinearityResult::evaluate(&inputs.linearity, &scale));

        let accuracy = match &calibration {
            Some(linearity) if plan.requires(TestSection::Accuracy) => Some(
                AccuracyResult::evaluate(&inputs.accuracy, &scale, &linearity.pooled),
            ),
            _ => None,
        };

        let precision = plan.requires(TestSection::Precision).then(|| {
            PrecisionResult::evaluate(
                &inputs.precision,
                self.config.precision.intermediate_max_difference_percent,
            )
        });

        let lod_loq = plan
            .requires(TestSection::LodLoq)
            .then(|| SensitivityResult::evaluate(&inputs.lod_loq));

        let robustness = plan
            .requires(TestSection::Robustness)
            .then(|| RobustnessResult::evaluate(&inputs.robustness));

        let mut dataset = ValidationDataset {
            method: method.clone(),
            input_digest,
            concentration_basis: self.config.concentration_basis,
            stock,
            recipes,
            sst: plan.requires(TestSection::Sst).then_some(sst),
            specificity,
            linearity: calibration.filter(|_| plan.requires(TestSection::Linearity)),
            accuracy,
            precision,
            lod_loq,
            robustness,
            summary: DatasetSummary::default(),
        };
        dataset.summarize();

        for section in dataset.sections() {
            for record in dataset.section_records(section).unwrap_or_default() {
                tracing::trace!(
                    %section,
                    label = %record.label,
                    value = ?record.measured_value,
                    verdict = %record.verdict,
                    "record"
                );
            }
        }
        tracing::debug!(
            sections = dataset.summary.sections.len(),
            status = %dataset.summary.status,
            verdict = %dataset.summary.verdict,
            "evaluation finished"
        );
        Ok(dataset)
    }
}
