//! `amv check` command - Input domain checks

use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use crate::cli::output::{effective_format, render_document, render_rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{Severity, ValidationInputs};
use crate::yaml::parse_yaml_file;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Input snapshot (YAML)
    pub file: PathBuf,

    /// Warnings become errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Tabled, Serialize)]
struct IssueRow {
    #[tabled(rename = "SEVERITY")]
    severity: String,
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "MESSAGE")]
    message: String,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let inputs: ValidationInputs = parse_yaml_file(&args.file)?;
    let issues = inputs.check();

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    let warnings = issues.len() - errors;

    match effective_format(global.format, OutputFormat::Tsv) {
        OutputFormat::Summary => {
            println!(
                "{} Checking {}...\n",
                style("→").blue(),
                args.file.display()
            );
            for issue in &issues {
                let mark = match issue.severity {
                    Severity::Error => style("✗").red(),
                    Severity::Warning => style("!").yellow(),
                };
                println!(
                    "  {} {} {}",
                    mark,
                    style(&issue.field).cyan(),
                    issue.message
                );
            }
            if issues.is_empty() {
                println!("{} No issues found", style("✓").green().bold());
            } else {
                println!(
                    "\n  Errors: {}  Warnings: {}",
                    style(errors).red(),
                    style(warnings).yellow()
                );
            }
        }
        format @ (OutputFormat::Yaml | OutputFormat::Json) => {
            print!("{}", render_document(&issues, format)?)
        }
        format => {
            let rows: Vec<IssueRow> = issues
                .iter()
                .map(|i| IssueRow {
                    severity: i.severity.to_string(),
                    field: i.field.clone(),
                    message: i.message.clone(),
                })
                .collect();
            print!("{}", render_rows(&rows, format)?);
        }
    }

    let failing = if args.strict { issues.len() } else { errors };
    if failing > 0 {
        return Err(miette::miette!(
            "Input check failed: {} error(s), {} warning(s)",
            errors,
            warnings
        ));
    }
    Ok(())
}
