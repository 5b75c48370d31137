//! Compiled-artifact candidate matching.
//!
//! One source file can produce several artifacts sharing its base name
//! (nested/synthetic units such as `Foo$1.class`, `Foo$Inner.class`).
//! The matcher scans the output directory for those and always appends
//! the exact `Foo.class` candidate on top.

use globset::{Glob, GlobSetBuilder};

use crate::core::mapper::MapError;
use crate::infra::vfs::Vfs;

/// Finds compiled-artifact candidates for a base name in an output
/// directory. No caching; built once per export from the mapping rules.
#[derive(Debug, Clone)]
pub struct ArtifactMatcher {
    /// Separator between a base name and a synthetic-unit suffix (`$`)
    marker: String,

    /// Artifact file extension, including the dot (`.class`)
    artifact_ext: String,
}

impl ArtifactMatcher {
    pub fn new(marker: impl Into<String>, artifact_ext: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            artifact_ext: artifact_ext.into(),
        }
    }

    /// Artifact candidates for `stem` inside `dir`.
    ///
    /// Returns every entry of `dir` matching `stem + marker + * +
    /// artifact_ext`, followed by the exact `stem + artifact_ext`
    /// candidate. The exact candidate is appended unconditionally, even
    /// when no filesystem check confirms it: these are candidates, not
    /// confirmed files, and the copy executor is the one asserting
    /// existence. A missing or unreadable `dir` degrades to just the
    /// exact candidate.
    pub fn candidates(
        &self,
        dir: &str,
        stem: &str,
        vfs: &dyn Vfs,
    ) -> Result<Vec<String>, MapError> {
        let pattern = format!(
            "{}{}*{}",
            globset::escape(stem),
            globset::escape(&self.marker),
            globset::escape(&self.artifact_ext),
        );
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new(&pattern)?);
        let matcher = builder.build()?;

        let mut out: Vec<String> = vfs
            .dir_entries(dir)
            .into_iter()
            .filter(|name| matcher.is_match(name))
            .map(|name| join_dir(dir, &name))
            .collect();

        out.push(join_dir(dir, &format!("{stem}{}", self.artifact_ext)));

        Ok(out)
    }
}

/// Join a directory path and a file name without doubling separators.
pub fn join_dir(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
