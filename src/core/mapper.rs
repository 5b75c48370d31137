//! Path mapping: turn a normalized file list into the ordered multiset of
//! (source, destination) pairs an export will copy, plus the list of
//! entries intentionally excluded from the structured mapping.
//!
//! Two passes per node, both appending to the same ordered sequence:
//! - a compile pass (artifact fan-out and descriptor pairing under the
//!   unit's source roots), active only when a compile context is given;
//! - a structured pass mirroring the node's location relative to the
//!   unit's content root.
//!
//! The result is deliberately a `Vec` of pairs and not a map: one source
//! routinely yields several destinations, and duplicates across the two
//! passes are retained in emission order.

use std::path::PathBuf;

use indexmap::IndexSet;
use tracing::debug;

use crate::core::artifacts::ArtifactMatcher;
use crate::core::unit::BuildUnit;
use crate::infra::vfs::{FileNode, Vfs};

/// Resolves the compiled-output root for a unit. Absence is a hard
/// configuration error in compile mode, not a per-file skip.
pub trait CompileContext {
    fn output_root(&self, unit: &BuildUnit) -> Option<String>;
}

/// Classifies paths the mapper must not artifact-map.
pub trait ProjectLayout {
    fn is_test_source(&self, path: &str) -> bool;
}

/// Mapping failures that abort the whole call.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Compile mode was requested but the unit has never produced output.
    #[error("no output directory for unit `{0}`")]
    MissingOutputRoot(String),

    /// The artifact candidate pattern could not be compiled.
    #[error("invalid artifact pattern: {0}")]
    Pattern(#[from] globset::Error),
}

/// Ordered multiset of (from, to) pairs plus the excluded names.
///
/// Append-only while mapping; immutable once returned. Every `from` is a
/// selected node, a node discovered during expansion, or an artifact
/// candidate; every `to` is rooted under the destination prefix.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PathResult {
    pub pairs: Vec<(PathBuf, PathBuf)>,
    pub unsettled: Vec<String>,
}

impl PathResult {
    fn push(&mut self, from: &str, to: &str) {
        self.pairs.push((PathBuf::from(from), PathBuf::from(to)));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Knobs the mapper reads; explicit values rather than process-wide
/// statics so tests and unusual projects can override them.
#[derive(Debug, Clone)]
pub struct MappingRules {
    /// Build-configuration file names never exported structurally
    pub exclude_files: IndexSet<String>,

    /// Extension of compilable sources (`java`)
    pub source_ext: String,

    /// Extension of descriptor/resource files paired with artifacts (`xml`)
    pub descriptor_ext: String,

    /// Artifact extension including the dot (`.class`)
    pub artifact_ext: String,

    /// Synthetic-unit marker in artifact names (`$`)
    pub synthetic_marker: String,

    /// Base-name prefix marking sources that never compile on their own (`_`)
    pub non_compilable_prefix: String,

    /// Destination subtree for artifact mappings (`codebase`)
    pub codebase_dir: String,
}

/// Computes (source, destination) pairs for one export call.
pub struct PathMapper<'a> {
    rules: &'a MappingRules,
    matcher: ArtifactMatcher,
    vfs: &'a dyn Vfs,
    layout: &'a dyn ProjectLayout,
}

impl<'a> PathMapper<'a> {
    pub fn new(rules: &'a MappingRules, vfs: &'a dyn Vfs, layout: &'a dyn ProjectLayout) -> Self {
        let matcher = ArtifactMatcher::new(
            rules.synthetic_marker.clone(),
            rules.artifact_ext.clone(),
        );
        Self { rules, matcher, vfs, layout }
    }

    /// Map every normalized node, in selection order, against `unit`.
    ///
    /// `dest_prefix` must not end with a separator; relative portions are
    /// emitted with their leading `/`. A missing compiled-output root in
    /// compile mode aborts the call before later nodes are processed.
    pub fn map_paths(
        &self,
        files: &[FileNode],
        unit: &BuildUnit,
        dest_prefix: &str,
        compile: Option<&dyn CompileContext>,
    ) -> Result<PathResult, MapError> {
        let mut result = PathResult::default();

        for node in files {
            let name = node.name();

            if let Some(compile) = compile {
                self.compile_pass(&mut result, node, unit, dest_prefix, compile)?;

                // Exclusion applies in compile mode only, after the
                // artifact sub-pass: an already-emitted artifact pair
                // stays in the result even for an excluded name.
                if self.rules.exclude_files.contains(name) {
                    debug!(name, "excluded from structured mapping");
                    result.unsettled.push(name.to_string());
                    continue;
                }
            }

            self.structured_pass(&mut result, node, unit, dest_prefix);
        }

        Ok(result)
    }

    /// Artifact fan-out and descriptor pairing for nodes under a source
    /// root (test sources are never artifact-mapped).
    fn compile_pass(
        &self,
        result: &mut PathResult,
        node: &FileNode,
        unit: &BuildUnit,
        dest_prefix: &str,
        compile: &dyn CompileContext,
    ) -> Result<(), MapError> {
        let Some(source_root) = source_root_of(&unit.source_roots, &node.path) else {
            return Ok(());
        };
        if self.layout.is_test_source(&node.path) {
            return Ok(());
        }

        let output_root = compile
            .output_root(unit)
            .ok_or_else(|| MapError::MissingOutputRoot(unit.name.clone()))?;

        // Path after the source root, e.g. "/com/a/Foo.java"
        let rel = rel_after(&node.path, source_root);
        // Directory portion with its trailing '/', e.g. "/com/a/"
        let package_dir = &rel[..rel.rfind('/').map_or(0, |i| i + 1)];

        let name = node.name();
        if let Some(stem) = strip_ext(name, &self.rules.source_ext) {
            if stem.starts_with(&self.rules.non_compilable_prefix) {
                // Not independently compilable; the structured pass still
                // exports the source itself.
                return Ok(());
            }
            let artifact_dir = format!("{output_root}{package_dir}");
            for from in self.matcher.candidates(&artifact_dir, stem, self.vfs)? {
                let file_name = from.rsplit('/').next().unwrap_or(&from);
                let to = format!(
                    "{dest_prefix}/{}{package_dir}{file_name}",
                    self.rules.codebase_dir
                );
                result.push(&from, &to);
            }
        } else if let Some(stem) = strip_ext(name, &self.rules.descriptor_ext) {
            // A descriptor is only paired when a confirmed artifact with
            // the same base name sits at the package location.
            let artifact = format!(
                "{output_root}{package_dir}{stem}{}",
                self.rules.artifact_ext
            );
            if self.vfs.exists(&artifact) {
                let to = format!("{dest_prefix}/{}{rel}", self.rules.codebase_dir);
                result.push(&node.path, &to);
            }
        }

        Ok(())
    }

    /// Mirror the node's location relative to the content root.
    fn structured_pass(
        &self,
        result: &mut PathResult,
        node: &FileNode,
        unit: &BuildUnit,
        dest_prefix: &str,
    ) {
        let Some(idx) = node.path.find(&unit.content_root) else {
            debug!(path = %node.path, "outside content root, not mapped");
            return;
        };
        let rel = &node.path[idx + unit.content_root.len()..];
        if rel.is_empty() {
            return;
        }
        result.push(&node.path, &format!("{dest_prefix}{rel}"));
    }
}

/// First source root the path lies under. Same raw substring containment
/// as the normalizer's collapse predicate.
fn source_root_of<'r>(source_roots: &'r [String], path: &str) -> Option<&'r String> {
    source_roots.iter().find(|root| path.contains(root.as_str()))
}

/// Portion of `path` after the first occurrence of `prefix`.
fn rel_after<'p>(path: &'p str, prefix: &str) -> &'p str {
    match path.find(prefix) {
        Some(idx) => &path[idx + prefix.len()..],
        None => path,
    }
}

/// Base name without `.ext`, matched case-insensitively.
fn strip_ext<'n>(name: &'n str, ext: &str) -> Option<&'n str> {
    let (stem, actual) = name.rsplit_once('.')?;
    actual.eq_ignore_ascii_case(ext).then_some(stem)
}
