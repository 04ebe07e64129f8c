//! `amv config` command - Show the effective configuration

use console::style;
use miette::Result;

use crate::cli::helpers::load_config;
use crate::cli::output::render_document;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::{Config, CONFIG_ENV, PROJECT_CONFIG};

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// List the configuration files that are consulted, in order
    #[arg(long)]
    pub paths: bool,
}

pub fn run(args: ConfigArgs, global: &GlobalOpts) -> Result<()> {
    if args.paths {
        let mut layers = Vec::new();
        if let Some(global_path) = Config::global_path() {
            layers.push(global_path);
        }
        layers.push(PROJECT_CONFIG.into());
        if let Some(explicit) = &global.config {
            layers.push(explicit.clone());
        }
        for path in layers {
            let mark = if path.exists() {
                style("✓").green()
            } else {
                style("-").dim()
            };
            println!("{} {}", mark, path.display());
        }
        if global.config.is_none() {
            println!("  (set {} or --config to add an explicit file)", CONFIG_ENV);
        }
        return Ok(());
    }

    let config = load_config(global)?;
    let format = match global.format {
        OutputFormat::Json => OutputFormat::Json,
        _ => OutputFormat::Yaml,
    };
    print!("{}", render_document(&config, format)?);
    Ok(())
}
