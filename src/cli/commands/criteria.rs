//! `amv criteria` command - Acceptance criteria table

use miette::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::helpers::load_config;
use crate::cli::output::{effective_format, render_document, render_rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::criteria::{Criterion, Metric};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct CriteriaArgs {}

#[derive(Debug, Tabled, Serialize)]
struct CriterionRow {
    #[tabled(rename = "TEST")]
    test: String,
    #[tabled(rename = "METRIC")]
    metric: String,
    #[tabled(rename = "CRITERION")]
    criterion: String,
}

/// Effective criterion of a metric, including the configured pluggable one
fn effective(metric: Metric, config: &Config) -> Option<Criterion> {
    match metric {
        Metric::IntermediatePrecisionDifference => config
            .precision
            .intermediate_max_difference_percent
            .map(|value| Criterion::MaxThreshold { value }),
        other => Criterion::canonical(other),
    }
}

pub fn run(_args: CriteriaArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let rows: Vec<CriterionRow> = Metric::all()
        .iter()
        .map(|&metric| CriterionRow {
            test: metric.test_name().to_string(),
            metric: metric.description().to_string(),
            criterion: effective(metric, &config)
                .map_or_else(|| "reported only".to_string(), |c| c.to_string()),
        })
        .collect();

    match effective_format(global.format, OutputFormat::Tsv) {
        format @ (OutputFormat::Yaml | OutputFormat::Json) => {
            print!("{}", render_document(&rows, format)?)
        }
        format => print!("{}", render_rows(&rows, format)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_intermediate_precision_follows_config() {
        let mut config = Config::default();
        assert_eq!(effective(Metric::IntermediatePrecisionDifference, &config), None);
        config.precision.intermediate_max_difference_percent = Some(dec!(3.0));
        assert_eq!(
            effective(Metric::IntermediatePrecisionDifference, &config),
            Some(Criterion::MaxThreshold { value: dec!(3.0) })
        );
        assert_eq!(
            effective(Metric::LoqSignalToNoise, &config),
            Criterion::canonical(Metric::LoqSignalToNoise)
        );
    }
}
