use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use amv::cli::{Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(&cli.global);

    let global = &cli.global;
    match cli.command {
        Commands::Init(args) => amv::cli::commands::init::run(args, global),
        Commands::Run(args) => amv::cli::commands::run::run(args, global),
        Commands::Recipe(args) => amv::cli::commands::recipe::run(args, global),
        Commands::Check(args) => amv::cli::commands::check::run(args, global),
        Commands::Criteria(args) => amv::cli::commands::criteria::run(args, global),
        Commands::Config(args) => amv::cli::commands::config::run(args, global),
        Commands::Completions(args) => amv::cli::commands::completions::run(args),
    }
}

/// Diagnostic logging to stderr; `RUST_LOG` wins over the flags
fn init_logging(global: &GlobalOpts) {
    let level = if global.quiet {
        "error"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("amv={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
