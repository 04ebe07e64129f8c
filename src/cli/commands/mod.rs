//! CLI command implementations

pub mod check;
pub mod completions;
pub mod config;
pub mod criteria;
pub mod init;
pub mod recipe;
pub mod run;
