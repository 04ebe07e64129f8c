//! `amv run` command - Evaluate an input snapshot

use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use crate::cli::helpers::{fmt_opt, load_config, rule, verdict_mark, verdict_styled};
use crate::cli::output::{effective_format, render_document, render_rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::criteria::EvaluationRecord;
use crate::core::engine::ValidationEngine;
use crate::core::plan::TestSection;
use crate::entities::{DatasetStatus, Severity, ValidationDataset, ValidationInputs};
use crate::yaml::parse_yaml_file;

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Input snapshot (YAML)
    pub file: PathBuf,

    /// Only show these sections in summary and table output
    #[arg(long, short = 's', value_delimiter = ',')]
    pub section: Vec<TestSection>,

    /// Exit with an error unless every record passes
    #[arg(long)]
    pub strict: bool,
}

/// One evaluation record as a table row
#[derive(Debug, Tabled, Serialize)]
struct RecordRow {
    #[tabled(rename = "SECTION")]
    section: String,
    #[tabled(rename = "CHECK")]
    label: String,
    #[tabled(rename = "MEASURED")]
    measured: String,
    #[tabled(rename = "CRITERION")]
    criterion: String,
    #[tabled(rename = "VERDICT")]
    verdict: String,
}

pub fn run(args: RunArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let inputs: ValidationInputs = parse_yaml_file(&args.file)?;

    for issue in inputs.check() {
        match issue.severity {
            Severity::Error => tracing::warn!(field = %issue.field, "{}", issue.message),
            Severity::Warning => tracing::info!(field = %issue.field, "{}", issue.message),
        }
    }

    let engine = ValidationEngine::new(config);
    let dataset = engine.evaluate(&inputs)?;

    match effective_format(global.format, OutputFormat::Yaml) {
        OutputFormat::Summary => print_summary(&dataset, &args.section),
        format if format.is_tabular() => {
            let rows = record_rows(&dataset, &args.section);
            print!("{}", render_rows(&rows, format)?);
        }
        format => print!("{}", render_document(&dataset, format)?),
    }

    if args.strict && !dataset.summary.verdict.is_pass() {
        return Err(miette::miette!(
            "Validation is {} ({} pass, {} fail, {} indeterminate)",
            dataset.summary.verdict,
            dataset.summary.totals.pass,
            dataset.summary.totals.fail,
            dataset.summary.totals.indeterminate
        ));
    }
    Ok(())
}

fn selected(dataset: &ValidationDataset, filter: &[TestSection]) -> Vec<TestSection> {
    dataset
        .sections()
        .into_iter()
        .filter(|s| filter.is_empty() || filter.contains(s))
        .collect()
}

fn record_rows(dataset: &ValidationDataset, filter: &[TestSection]) -> Vec<RecordRow> {
    let mut rows = Vec::new();
    for section in selected(dataset, filter) {
        for record in dataset.section_records(section).unwrap_or_default() {
            rows.push(RecordRow {
                section: section.to_string(),
                label: record.label.clone(),
                measured: fmt_opt(record.measured_value),
                criterion: record.criterion.to_string(),
                verdict: record.verdict.to_string(),
            });
        }
    }
    rows
}

fn print_summary(dataset: &ValidationDataset, filter: &[TestSection]) {
    let method = &dataset.method;
    println!(
        "{} {}",
        style("Method").bold(),
        style(&method.name).cyan().bold()
    );
    if !method.instrument.is_empty() || !method.column.is_empty() {
        println!("  {} / {}", method.instrument, method.column);
    }
    println!(
        "  Target: {} {}   Basis: {}   Digest: {}",
        method.target_concentration,
        method.unit,
        dataset.concentration_basis,
        style(&dataset.input_digest[..12.min(dataset.input_digest.len())]).dim()
    );
    println!(
        "  Stock: {} (factor {})",
        fmt_opt(dataset.stock.actual_stock_conc),
        fmt_opt(dataset.stock.correction_factor)
    );

    if !dataset.recipes.is_empty() {
        println!();
        println!("{}", style("Recipes").bold());
        for level in &dataset.recipes {
            println!(
                "  {:>6}%  {} {}  stock {} mL + diluent {} mL = {} mL",
                level.level_percent,
                level.target_conc,
                method.unit,
                level.stock_volume_ml,
                level.diluent_volume_ml,
                level.total_volume_ml
            );
        }
    }

    for section in selected(dataset, filter) {
        println!();
        println!("{}", rule());
        match dataset.section_verdict(section) {
            Some(verdict) => println!(
                "{}  {}",
                style(section.title()).bold(),
                verdict_styled(verdict)
            ),
            None => println!("{}", style(section.title()).bold()),
        }
        println!("{}", rule());

        match (section, &dataset.robustness) {
            (TestSection::Robustness, Some(robustness)) => {
                for condition in &robustness.conditions {
                    println!(
                        "  {} ({} injections)",
                        style(&condition.condition).underlined(),
                        condition.injections
                    );
                    print_records(&condition.records);
                }
            }
            _ => print_records(dataset.section_records(section).unwrap_or_default()),
        }
    }

    let summary = &dataset.summary;
    println!();
    println!(
        "{} pass, {} fail, {} indeterminate",
        style(summary.totals.pass).green(),
        style(summary.totals.fail).red(),
        style(summary.totals.indeterminate).yellow()
    );
    match summary.status {
        DatasetStatus::Complete => println!(
            "{} Dataset complete: {}",
            verdict_mark(summary.verdict),
            verdict_styled(summary.verdict)
        ),
        DatasetStatus::Incomplete => println!(
            "{} Dataset incomplete; fill in the blank values to reach a verdict",
            style("?").yellow()
        ),
    }
}

fn print_records<'a>(records: impl IntoIterator<Item = &'a EvaluationRecord>) {
    for record in records {
        println!(
            "  {} {:<28} {:>12}   {}",
            verdict_mark(record.verdict),
            record.label,
            fmt_opt(record.measured_value),
            style(record.criterion.to_string()).dim()
        );
    }
}
