//! Export orchestration: validate the request, normalize the selection,
//! map paths, then copy the pairs to the destination tree and report.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::{debug, warn};

use crate::cli::{AppContext, ExportArgs};
use crate::core::mapper::{CompileContext, PathMapper, PathResult, ProjectLayout};
use crate::core::normalize::normalize;
use crate::core::unit::{BuildUnit, ModuleResolver};
use crate::infra::config::load_config;
use crate::infra::prefs::ExportPaths;
use crate::infra::vfs::{FileNode, RealFs, node_path};

/// Compile context backed by unit configuration: the output root exists
/// once an external build has produced it. Triggering a build is not
/// this tool's job.
struct ConfiguredOutput;

impl CompileContext for ConfiguredOutput {
    fn output_root(&self, unit: &BuildUnit) -> Option<String> {
        unit.compiled_output.clone()
    }
}

/// Test classification by the unit's configured test roots.
struct UnitLayout<'a> {
    unit: &'a BuildUnit,
}

impl ProjectLayout for UnitLayout<'_> {
    fn is_test_source(&self, path: &str) -> bool {
        self.unit
            .test_roots
            .iter()
            .any(|root| path.contains(root.as_str()))
    }
}

pub fn run(args: ExportArgs, ctx: &AppContext) -> Result<()> {
    let config = load_config().unwrap_or_default();

    if args.paths.is_empty() {
        anyhow::bail!("select at least one file or directory");
    }

    // Absolutize the selection up front; the engine works on plain
    // '/'-separated strings from here on.
    let selection: Vec<FileNode> = args
        .paths
        .iter()
        .map(|p| {
            let abs = dunce::canonicalize(p)
                .with_context(|| format!("cannot resolve path: {}", p.display()))?;
            let is_dir = abs.is_dir();
            Ok(FileNode { path: node_path(&abs), is_dir })
        })
        .collect::<Result<_>>()?;

    let units = config.build_units();
    if units.is_empty() {
        anyhow::bail!("no build units configured; run `pup init` and add [[units]] entries");
    }

    let resolver = ModuleResolver::new(&config.unit_root_pattern)?;
    let sel_paths: Vec<String> = selection.iter().map(|n| n.path.clone()).collect();
    let unit = resolver
        .resolve(&units, args.unit.as_deref(), &sel_paths)
        .context("cannot determine the owning unit (selection ambiguous or unknown); pass --unit")?;

    // Destination: explicit flag, then the remembered one, then the default.
    let mut prefs = ExportPaths::load(Path::new("."));
    let dest_base = args
        .dest
        .clone()
        .or_else(|| prefs.get(&unit.name).map(String::from))
        .unwrap_or_else(|| config.default_dest.clone());
    let dest_base = shellexpand::tilde(&dest_base).into_owned();
    let dest_prefix = unit_dest_prefix(&dest_base, &unit.name);

    let files = normalize(&selection, &RealFs);
    debug!(selected = selection.len(), normalized = files.len(), unit = %unit.name);

    let rules = config.rules();
    let layout = UnitLayout { unit };
    let mapper = PathMapper::new(&rules, &RealFs, &layout);
    let compile = ConfiguredOutput;
    let compile_ctx: Option<&dyn CompileContext> =
        (!args.source_only).then_some(&compile as &dyn CompileContext);

    let result = mapper.map_paths(&files, unit, &dest_prefix, compile_ctx)?;

    if ctx.dry_run {
        if !ctx.quiet {
            println!("{}", "DRY RUN: Would export:".yellow());
            for (from, to) in &result.pairs {
                println!("  {} -> {}", from.display(), to.display());
            }
            for name in &result.unsettled {
                println!("  {} {}", "excluded:".yellow(), name);
            }
        }
        return Ok(());
    }

    if args.clean && Path::new(&dest_prefix).exists() {
        fs::remove_dir_all(&dest_prefix)
            .with_context(|| format!("Failed to clean {dest_prefix}"))?;
    }

    let progress = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(result.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    };

    let (copied, missing) = copy_pairs(&result, &progress)?;
    progress.finish_and_clear();

    if !args.no_remember {
        prefs.remember(&unit.name, &dest_base)?;
    }

    if !ctx.quiet {
        println!(
            "{} Exported {} files to {}",
            "✓".green(),
            copied,
            dest_prefix
        );
        if missing > 0 {
            println!("  {} sources were missing and skipped", missing);
        }
        if !result.unsettled.is_empty() {
            println!("{}", "Warning: not exported:".yellow());
            println!("  {}", result.unsettled.iter().join(",\n  "));
        }
    }

    Ok(())
}

/// `<base>/<unit-name>`, tolerating a trailing separator on the base.
fn unit_dest_prefix(base: &str, unit_name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), unit_name)
}

/// Copy every pair in order. A directory source materializes an empty
/// destination directory; a missing file source is skipped and counted,
/// never fatal.
fn copy_pairs(result: &PathResult, progress: &ProgressBar) -> Result<(usize, usize)> {
    let mut copied = 0usize;
    let mut missing = 0usize;

    for (from, to) in &result.pairs {
        if from.is_dir() {
            fs::create_dir_all(to)
                .with_context(|| format!("Failed to create {}", to.display()))?;
            copied += 1;
        } else if from.exists() {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::copy(from, to).with_context(|| {
                format!("Failed to copy {} to {}", from.display(), to.display())
            })?;
            copied += 1;
        } else {
            // Predicted artifacts are candidates, not confirmed files.
            warn!(from = %from.display(), "missing source, skipped");
            missing += 1;
        }
        progress.inc(1);
        progress.set_message(format!("{}", to.display()));
    }

    Ok((copied, missing))
}
