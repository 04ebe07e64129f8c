//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::{style, StyledObject};
use rust_decimal::Decimal;

use crate::core::criteria::Verdict;
use crate::core::Config;
use crate::cli::GlobalOpts;

/// Placeholder shown for a blank value
pub const BLANK: &str = "—";

/// Format an optional decimal, keeping its truncated precision
pub fn fmt_opt(value: Option<Decimal>) -> String {
    value.map_or_else(|| BLANK.to_string(), |v| v.to_string())
}

/// Coloured marker for a verdict
pub fn verdict_mark(verdict: Verdict) -> StyledObject<&'static str> {
    match verdict {
        Verdict::Pass => style("✓").green(),
        Verdict::Fail => style("✗").red(),
        Verdict::Indeterminate => style("?").yellow(),
    }
}

/// Coloured verdict word
pub fn verdict_styled(verdict: Verdict) -> StyledObject<String> {
    let word = verdict.to_string().to_uppercase();
    match verdict {
        Verdict::Pass => style(word).green().bold(),
        Verdict::Fail => style(word).red().bold(),
        Verdict::Indeterminate => style(word).yellow(),
    }
}

/// Load configuration for a command, honouring `--config`
pub fn load_config(global: &GlobalOpts) -> miette::Result<Config> {
    Ok(Config::load_with(global.config.as_deref())?)
}

/// Horizontal rule used between report sections
pub fn rule() -> StyledObject<String> {
    style("─".repeat(60)).dim()
}
