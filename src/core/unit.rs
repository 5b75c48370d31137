//! Build units and selection-to-unit resolution.
//!
//! A build unit is a named, independently buildable subdivision of a
//! project: one content root, ordered source roots, and an optional
//! compiled-output root that only exists once a build has run. Units are
//! read-only inputs to the engine; the CLI loads them from `patchup.toml`.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use regex::Regex;

use crate::cli::{AppContext, UnitArgs};
use crate::infra::config::load_config;
use crate::infra::vfs::node_path;

/// A named, independently buildable subdivision of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildUnit {
    pub name: String,

    /// Top-level directory containing all of the unit's files
    pub content_root: String,

    /// Directories beneath the content root holding compilable sources
    pub source_roots: Vec<String>,

    /// Directories holding test sources; never artifact-mapped
    pub test_roots: Vec<String>,

    /// Where compiled artifacts land; absent until a build has run
    pub compiled_output: Option<String>,

    /// Directory of the unit's own descriptor, used for pattern-based
    /// resolution; defaults to the content root
    pub unit_dir: String,
}

/// Resolves which build unit owns a selection.
///
/// The pattern must expose the unit directory as capture group 1 and the
/// unit-name segment as capture group 3, as in the default
/// `((.+)/(.+))/(src|WebRoot)/.*`.
pub struct ModuleResolver {
    pattern: Regex,
}

impl ModuleResolver {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("invalid unit root pattern: {pattern}"))?;
        Ok(Self { pattern })
    }

    /// Unit directory and unit-name segment extracted from one path,
    /// if the path matches the pattern at all.
    fn unit_root(&self, path: &str) -> Option<(String, String)> {
        let caps = self.pattern.captures(path)?;
        let dir = caps.get(1)?.as_str().to_string();
        let segment = caps.get(3)?.as_str().to_string();
        Some((dir, segment))
    }

    /// True iff two or more selected paths resolve to different
    /// unit-name segments.
    pub fn is_not_same_module(&self, paths: &[String]) -> bool {
        let mut seen: Option<String> = None;
        for path in paths {
            if let Some((_, segment)) = self.unit_root(path) {
                if let Some(prev) = &seen
                    && *prev != segment
                {
                    return true;
                }
                seen = Some(segment);
            }
        }
        false
    }

    /// Resolve the single owning unit for a selection, or `None` when
    /// the caller has to ask the user.
    ///
    /// Precedence: a single known unit wins outright; an explicitly
    /// declared active unit wins next; otherwise all selected paths must
    /// agree on one unit-root segment, which is then mapped to a unit by
    /// its descriptor location.
    pub fn resolve<'a>(
        &self,
        units: &'a [BuildUnit],
        active: Option<&str>,
        paths: &[String],
    ) -> Option<&'a BuildUnit> {
        if let [only] = units {
            return Some(only);
        }
        if let Some(name) = active {
            return units.iter().find(|u| u.name == name);
        }
        if self.is_not_same_module(paths) {
            return None;
        }
        let (dir, _) = paths.iter().find_map(|p| self.unit_root(p))?;
        units.iter().find(|u| u.unit_dir == dir)
    }
}

/// `pup unit` — report which build unit owns a selection.
pub fn run(args: UnitArgs, ctx: &AppContext) -> Result<()> {
    let config = load_config().unwrap_or_default();
    let units = config.build_units();
    let resolver = ModuleResolver::new(&config.unit_root_pattern)?;

    let paths: Vec<String> = args
        .paths
        .iter()
        .map(|p| {
            dunce::canonicalize(p)
                .map(|abs| node_path(&abs))
                .with_context(|| format!("cannot resolve path: {}", p.display()))
        })
        .collect::<Result<_>>()?;

    if resolver.is_not_same_module(&paths) {
        anyhow::bail!("selection spans multiple build units");
    }

    match resolver.resolve(&units, None, &paths) {
        Some(unit) => {
            if !ctx.quiet {
                println!("{} {}", "✓".green(), unit.name);
                println!("  content root: {}", unit.content_root);
            }
            Ok(())
        }
        None => anyhow::bail!(
            "cannot determine the owning unit; add it to patchup.toml or pass --unit to export"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: &str = "((.+)/(.+))/(src|WebRoot)/.*";

    fn unit(name: &str, dir: &str) -> BuildUnit {
        BuildUnit {
            name: name.to_string(),
            content_root: dir.to_string(),
            source_roots: vec![format!("{dir}/src")],
            test_roots: Vec::new(),
            compiled_output: None,
            unit_dir: dir.to_string(),
        }
    }

    #[test]
    fn extracts_unit_root_segment() -> Result<()> {
        let resolver = ModuleResolver::new(PATTERN)?;
        let (dir, segment) = resolver
            .unit_root("/code/trunk/misc-server/src/com/a/B.java")
            .expect("pattern should match");

        assert_eq!(dir, "/code/trunk/misc-server");
        assert_eq!(segment, "misc-server");
        Ok(())
    }

    #[test]
    fn webroot_paths_match_too() -> Result<()> {
        let resolver = ModuleResolver::new(PATTERN)?;
        let (dir, segment) = resolver
            .unit_root("/code/app/WebRoot/index.jsp")
            .expect("pattern should match");

        assert_eq!(dir, "/code/app");
        assert_eq!(segment, "app");
        Ok(())
    }

    #[test]
    fn mixed_units_are_flagged() -> Result<()> {
        let resolver = ModuleResolver::new(PATTERN)?;
        let paths = vec![
            "/code/a/src/X.java".to_string(),
            "/code/b/src/Y.java".to_string(),
        ];

        assert!(resolver.is_not_same_module(&paths));
        Ok(())
    }

    #[test]
    fn same_unit_is_not_flagged() -> Result<()> {
        let resolver = ModuleResolver::new(PATTERN)?;
        let paths = vec![
            "/code/a/src/X.java".to_string(),
            "/code/a/src/sub/Y.java".to_string(),
            "/code/a/README.md".to_string(), // non-matching paths are ignored
        ];

        assert!(!resolver.is_not_same_module(&paths));
        Ok(())
    }

    #[test]
    fn single_unit_wins_outright() -> Result<()> {
        let resolver = ModuleResolver::new(PATTERN)?;
        let units = vec![unit("solo", "/code/solo")];

        let found = resolver.resolve(&units, None, &[]);
        assert_eq!(found.map(|u| u.name.as_str()), Some("solo"));
        Ok(())
    }

    #[test]
    fn explicit_active_unit_wins_over_paths() -> Result<()> {
        let resolver = ModuleResolver::new(PATTERN)?;
        let units = vec![unit("a", "/code/a"), unit("b", "/code/b")];
        let paths = vec!["/code/a/src/X.java".to_string()];

        let found = resolver.resolve(&units, Some("b"), &paths);
        assert_eq!(found.map(|u| u.name.as_str()), Some("b"));
        Ok(())
    }

    #[test]
    fn agreeing_paths_resolve_by_unit_dir() -> Result<()> {
        let resolver = ModuleResolver::new(PATTERN)?;
        let units = vec![unit("a", "/code/a"), unit("b", "/code/b")];
        let paths = vec![
            "/code/b/src/X.java".to_string(),
            "/code/b/src/sub/Y.java".to_string(),
        ];

        let found = resolver.resolve(&units, None, &paths);
        assert_eq!(found.map(|u| u.name.as_str()), Some("b"));
        Ok(())
    }

    #[test]
    fn ambiguous_selection_resolves_to_none() -> Result<()> {
        let resolver = ModuleResolver::new(PATTERN)?;
        let units = vec![unit("a", "/code/a"), unit("b", "/code/b")];
        let paths = vec![
            "/code/a/src/X.java".to_string(),
            "/code/b/src/Y.java".to_string(),
        ];

        assert!(resolver.resolve(&units, None, &paths).is_none());
        Ok(())
    }
}
