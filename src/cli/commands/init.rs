//! `amv init` command - Write a blank input snapshot

use console::style;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::plan::MethodCategory;
use crate::schema::template::{TemplateContext, TemplateGenerator};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// File to create
    #[arg(default_value = "inputs.yaml")]
    pub path: PathBuf,

    /// Method name or code
    #[arg(long, short = 'm', default_value = "METHOD-001")]
    pub method: String,

    /// Target (100 %) concentration
    #[arg(long, short = 't')]
    pub target: Decimal,

    /// Concentration unit
    #[arg(long, default_value = "mg/mL")]
    pub unit: String,

    /// Test category (identification, assay, impurity_quantitative, impurity_limit)
    #[arg(long, short = 'c')]
    pub category: Option<MethodCategory>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(miette::miette!(
            help = "use --force to overwrite it",
            "{} already exists",
            args.path.display()
        ));
    }
    if args.target <= Decimal::ZERO {
        return Err(miette::miette!(
            "Target concentration must be positive, got {}",
            args.target
        ));
    }

    let config = load_config(global)?;
    let mut ctx = TemplateContext::new(&args.method, args.target, &config.recipe)
        .with_unit(&args.unit);
    if let Some(category) = args.category {
        ctx = ctx.with_category(category);
    }

    let generator = TemplateGenerator::new()?;
    let content = generator.generate_inputs(&ctx)?;

    if let Some(parent) = args.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(&args.path, content).into_diagnostic()?;
    tracing::debug!(path = %args.path.display(), "wrote input template");

    if !global.quiet {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(args.path.display()).cyan()
        );
        println!(
            "   Fill in the measured values, then run {}",
            style(format!("amv run {}", args.path.display())).yellow()
        );
    }
    Ok(())
}
