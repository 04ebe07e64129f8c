//! AMV: Analytical Method Validation toolkit
//!
//! Turns a snapshot of raw laboratory inputs (weighings, purity and water
//! corrections, instrument responses) into corrected stock concentrations,
//! dilution recipes, calibration fits and ICH Q2 pass/fail verdicts.
//!
//! ```no_run
//! use amv::core::{Config, ValidationEngine};
//! use amv::entities::ValidationInputs;
//!
//! # fn main() -> miette::Result<()> {
//! let inputs: ValidationInputs = amv::yaml::parse_yaml_file("inputs.yaml".as_ref())?;
//! let dataset = ValidationEngine::new(Config::load()).evaluate(&inputs)?;
//! println!("{}", dataset.summary.verdict);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
pub mod yaml;
