//! Command line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, config::ConfigArgs, criteria::CriteriaArgs,
    init::InitArgs, recipe::RecipeArgs, run::RunArgs,
};

#[derive(Parser, Debug)]
#[command(name = "amv")]
#[command(author, version, about = "Analytical method validation calculations")]
#[command(
    long_about = "Derives stock corrections, dilution recipes, calibration fits and ICH Q2 \
pass/fail verdicts from a YAML snapshot of raw laboratory inputs."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// Configuration file applied on top of global and project settings
    #[arg(long, global = true, env = "AMV_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More diagnostic logging on stderr (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a blank input snapshot to fill in
    Init(InitArgs),

    /// Evaluate an input snapshot and print the dataset
    Run(RunArgs),

    /// Plan the dilution recipes and stock consumption
    Recipe(RecipeArgs),

    /// Check an input snapshot for implausible values
    Check(CheckArgs),

    /// List the acceptance criteria
    Criteria(CriteriaArgs),

    /// Show the effective configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Pick per command (summary or table on a terminal, YAML when piped)
    #[default]
    Auto,
    Yaml,
    Json,
    /// Human-readable report
    Summary,
    Tsv,
    Csv,
    /// Markdown table
    Md,
}

impl OutputFormat {
    /// Tabular formats that need one row per record
    pub fn is_tabular(&self) -> bool {
        matches!(self, OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md)
    }
}
