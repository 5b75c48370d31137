use anyhow::Result;
use clap::Parser;
use patchup::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Export(args) => patchup::export_run(args, &ctx),
        Commands::Unit(args) => patchup::unit_run(args, &ctx),
        Commands::Init(args) => patchup::infra::config::init(args, &ctx),
        Commands::Completions(args) => patchup::completion::run(args, &ctx),
    }
}
