//! `amv recipe` command - Master recipe and stock consumption

use console::style;
use miette::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use crate::cli::helpers::load_config;
use crate::cli::output::{effective_format, render_document, render_rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dilution::{plan_materials, MaterialPlan, RecipeSet};
use crate::entities::ValidationInputs;
use crate::yaml::parse_yaml_file;

#[derive(clap::Args, Debug)]
pub struct RecipeArgs {
    /// Input snapshot to take the target and stock from
    pub file: Option<PathBuf>,

    /// Target (100 %) concentration, overrides the input file
    #[arg(long, short = 't')]
    pub target: Option<Decimal>,

    /// Stock concentration, overrides the input file
    #[arg(long, short = 's')]
    pub stock: Option<Decimal>,

    /// Flask volume in mL for every set
    #[arg(long)]
    pub volume: Option<Decimal>,

    /// Ad-hoc levels in percent instead of the configured sets (e.g. 80,100,120)
    #[arg(long, value_delimiter = ',')]
    pub levels: Vec<Decimal>,

    /// Preparations per ad-hoc level
    #[arg(long, default_value_t = 1, requires = "levels")]
    pub preparations: u32,

    /// Only plan these configured sets
    #[arg(long, value_delimiter = ',', conflicts_with = "levels")]
    pub set: Vec<String>,

    /// Stock volume available in mL (defaults to the stock flask volume)
    #[arg(long)]
    pub available: Option<Decimal>,
}

/// One flask as a table row
#[derive(Debug, Tabled, Serialize)]
struct RecipeRow {
    #[tabled(rename = "SET")]
    set: String,
    #[tabled(rename = "LEVEL %")]
    level_percent: Decimal,
    #[tabled(rename = "CONC")]
    target_conc: Decimal,
    #[tabled(rename = "STOCK mL")]
    stock_volume_ml: Decimal,
    #[tabled(rename = "DILUENT mL")]
    diluent_volume_ml: Decimal,
    #[tabled(rename = "TOTAL mL")]
    total_volume_ml: Decimal,
    #[tabled(rename = "PREPS")]
    preparations: u32,
}

pub fn run(args: RecipeArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let inputs: Option<ValidationInputs> = match &args.file {
        Some(path) => Some(parse_yaml_file(path)?),
        None => None,
    };

    let target = args
        .target
        .or_else(|| inputs.as_ref().map(|i| i.method.target_concentration))
        .ok_or_else(|| miette::miette!("Target concentration required: pass FILE or --target"))?;

    let stock = match args.stock {
        Some(stock) => stock,
        None => {
            let stock = inputs.as_ref().map(|i| &i.stock).ok_or_else(|| {
                miette::miette!("Stock concentration required: pass FILE or --stock")
            })?;
            stock.planning_conc().ok_or_else(|| {
                miette::miette!(
                    help = "fill in the weighing and flask volume, or theoretical_stock",
                    "Stock concentration is still blank in the input file"
                )
            })?
        }
    };

    let available = args
        .available
        .or_else(|| inputs.as_ref().and_then(|i| i.stock.final_volume_ml));

    let mut sets: Vec<RecipeSet> = if !args.levels.is_empty() {
        vec![RecipeSet::new("custom", args.levels.clone(), args.preparations)]
    } else if args.set.is_empty() {
        config.recipe.sets.clone()
    } else {
        let mut chosen = Vec::new();
        for name in &args.set {
            let set = config
                .recipe
                .sets
                .iter()
                .find(|s| &s.name == name)
                .ok_or_else(|| miette::miette!("No recipe set named '{}' in the configuration", name))?;
            chosen.push(set.clone());
        }
        chosen
    };

    if let Some(volume) = args.volume {
        for set in &mut sets {
            set.total_volume_ml = Some(volume);
        }
    }

    let plan = plan_materials(
        target,
        stock,
        config.recipe.total_volume_ml,
        &sets,
        available,
    )?;

    match effective_format(global.format, OutputFormat::Tsv) {
        OutputFormat::Summary => print_plan(&plan),
        format @ (OutputFormat::Yaml | OutputFormat::Json) => {
            print!("{}", render_document(&plan, format)?)
        }
        format => print!("{}", render_rows(&rows(&plan), format)?),
    }
    Ok(())
}

fn rows(plan: &MaterialPlan) -> Vec<RecipeRow> {
    plan.sets
        .iter()
        .flat_map(|set| {
            set.levels.iter().map(move |level| RecipeRow {
                set: set.name.clone(),
                level_percent: level.level_percent,
                target_conc: level.target_conc,
                stock_volume_ml: level.stock_volume_ml,
                diluent_volume_ml: level.diluent_volume_ml,
                total_volume_ml: level.total_volume_ml,
                preparations: set.preparations,
            })
        })
        .collect()
}

fn print_plan(plan: &MaterialPlan) {
    println!(
        "{} Target {}  Stock {}",
        style("Master recipe").bold(),
        style(plan.target_conc).cyan(),
        style(plan.stock_conc).cyan()
    );
    print!("{}", render_rows(&rows(plan), OutputFormat::Summary).unwrap_or_default());

    for set in &plan.sets {
        println!(
            "  {:<12} {} mL stock",
            set.name,
            style(set.stock_consumption_ml).cyan()
        );
    }
    println!(
        "  {:<12} {} mL stock",
        style("total").bold(),
        style(plan.total_stock_ml).bold()
    );

    match (plan.available_stock_ml, plan.sufficient_volume) {
        (Some(available), Some(true)) => println!(
            "{} Stock volume {} mL covers the plan",
            style("✓").green(),
            available
        ),
        (Some(available), Some(false)) => println!(
            "{} Stock volume {} mL is not enough; prepare more stock",
            style("✗").red(),
            available
        ),
        _ => {}
    }
}
