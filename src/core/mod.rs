//! Core module - calculation primitives, configuration and the engine

pub mod config;
pub mod criteria;
pub mod dilution;
pub mod engine;
pub mod plan;
pub mod regression;
pub mod rounding;
pub mod stats;
pub mod stock;

pub use config::{ConcentrationBasis, Config, ConfigError};
pub use criteria::{Criterion, EvaluationRecord, Metric, Verdict};
pub use dilution::{
    plan_materials, ConcentrationScale, DilutionError, DilutionLevel, MaterialPlan, RecipeSet,
    StockInsufficientError,
};
pub use engine::{EngineError, ValidationEngine};
pub use plan::{MethodCategory, TestSection, ValidationPlan};
pub use regression::RegressionResult;
pub use stock::{StockCorrection, StockPreparation};
