use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "patchup")]
#[command(
    about = "A lightweight CLI for exporting patch sets of sources and build artifacts from project build units"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export selected files (and their build artifacts) as a patch set
    Export(ExportArgs),

    /// Resolve which build unit owns a selection
    Unit(UnitArgs),

    /// Initialize a patchup.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Files and directories to export (overlap and nesting are fine)
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Destination directory; defaults to the remembered one for the unit
    #[arg(short, long)]
    pub dest: Option<String>,

    /// Build unit owning the selection (overrides path-based resolution)
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Export sources only, skipping compiled artifacts
    #[arg(long)]
    pub source_only: bool,

    /// Delete the unit's destination subtree before copying
    #[arg(long)]
    pub clean: bool,

    /// Do not remember the destination for this unit
    #[arg(long)]
    pub no_remember: bool,
}

#[derive(Parser)]
pub struct UnitArgs {
    /// Selected files and directories
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
