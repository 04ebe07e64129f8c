//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::IsTerminal;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
///
/// `Auto` means the human-readable form on a terminal and `piped` otherwise.
pub fn effective_format(format: OutputFormat, piped: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if std::io::stdout().is_terminal() {
                OutputFormat::Summary
            } else {
                piped
            }
        }
        other => other,
    }
}

/// Serialize a document as YAML or JSON
pub fn render_document<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .into_diagnostic(),
        _ => serde_yml::to_string(value).into_diagnostic(),
    }
}

/// Render rows as a table in the requested tabular format
pub fn render_rows<T>(rows: &[T], format: OutputFormat) -> Result<String>
where
    T: Tabled + Serialize,
{
    match format {
        OutputFormat::Csv => write_delimited(rows, b','),
        OutputFormat::Tsv => write_delimited(rows, b'\t'),
        OutputFormat::Md => Ok(Table::new(rows).with(Style::markdown()).to_string() + "\n"),
        _ => Ok(Table::new(rows).with(Style::rounded()).to_string() + "\n"),
    }
}

fn write_delimited<T: Serialize>(rows: &[T], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).into_diagnostic()?;
    }
    let bytes = writer.into_inner().into_diagnostic()?;
    String::from_utf8(bytes).into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        name: String,
        value: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "RSD, RT".to_string(),
                value: "0.12".to_string(),
            },
            Row {
                name: "Tailing".to_string(),
                value: "1.1".to_string(),
            },
        ]
    }

    #[test]
    fn test_explicit_format_is_kept() {
        assert_eq!(
            effective_format(OutputFormat::Json, OutputFormat::Yaml),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_csv_quotes_commas() {
        let out = render_rows(&rows(), OutputFormat::Csv).unwrap();
        assert_eq!(out, "name,value\n\"RSD, RT\",0.12\nTailing,1.1\n");
    }

    #[test]
    fn test_tsv() {
        let out = render_rows(&rows(), OutputFormat::Tsv).unwrap();
        assert!(out.starts_with("name\tvalue\n"));
    }

    #[test]
    fn test_markdown_table_has_header() {
        let out = render_rows(&rows(), OutputFormat::Md).unwrap();
        assert!(out.lines().next().unwrap().contains("name"));
        assert!(out.contains("| Tailing"));
    }
}
