//! Validation sections - inputs and evaluators per ICH Q2 characteristic

pub mod accuracy;
pub mod dataset;
pub mod inputs;
pub mod linearity;
pub mod method;
pub mod precision;
pub mod robustness;
pub mod sensitivity;
pub mod specificity;
pub mod sst;

pub use dataset::{DatasetStatus, DatasetSummary, ValidationDataset, VerdictCounts};
pub use inputs::{InputIssue, Severity, ValidationInputs};
pub use method::MethodParameters;
