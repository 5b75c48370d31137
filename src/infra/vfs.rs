//! Filepath: src/infra/vfs.rs
//! Filesystem boundary for the export engine.
//!
//! The engine never touches `std::fs` directly; everything goes through
//! the `Vfs` trait so tests can run against fixture trees and the engine
//! can honor its degrade-to-empty contract (a missing or unreadable
//! directory yields no children / no entries, never an error).
//!
//! Paths are carried as `String` with `/` separators because the
//! normalizer and mapper compare them with raw substring operations
//! (see `core::normalize::subsumes`).

use std::fs;
use std::path::Path;

/// A filesystem entry as seen by the export engine.
///
/// Children are never stored on the node; they are obtained lazily
/// through [`Vfs::children`]. Immutable for the duration of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode
{
    /// Absolute path, `/`-separated
    pub path: String,

    /// Whether this entry is a directory
    pub is_dir: bool,
}

impl FileNode
{
    pub fn file(path: impl Into<String>) -> Self
    {
        Self { path: path.into(), is_dir: false }
    }

    pub fn dir(path: impl Into<String>) -> Self
    {
        Self { path: path.into(), is_dir: true }
    }

    /// Final path segment (file or directory name).
    pub fn name(&self) -> &str
    {
        self.path
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }
}

/// Narrow read-only filesystem interface consumed by the engine.
pub trait Vfs
{
    /// Children of a directory node, sorted by path for determinism.
    /// Empty for files, empty directories, and unreadable directories.
    fn children(
        &self,
        node: &FileNode,
    ) -> Vec<FileNode>;

    /// Whether a path exists on disk.
    fn exists(
        &self,
        path: &str,
    ) -> bool;

    /// File names (not paths) directly inside `dir`, sorted.
    /// Empty when `dir` is missing or unreadable.
    fn dir_entries(
        &self,
        dir: &str,
    ) -> Vec<String>;
}

/// `Vfs` over the real filesystem.
pub struct RealFs;

/// Convert an OS path to the engine's `/`-separated string form.
pub fn node_path(path: &Path) -> String
{
    path.to_string_lossy()
        .replace('\\', "/")
}

impl Vfs for RealFs
{
    fn children(
        &self,
        node: &FileNode,
    ) -> Vec<FileNode>
    {
        if !node.is_dir
        {
            return Vec::new();
        }

        let Ok(entries) = fs::read_dir(&node.path)
        else
        {
            return Vec::new();
        };

        let mut out: Vec<FileNode> = entries
            .filter_map(|res| res.ok())
            .map(|entry| {
                let is_dir = entry
                    .file_type()
                    .map(|ft| ft.is_dir())
                    .unwrap_or(false);
                FileNode { path: node_path(&entry.path()), is_dir }
            })
            .collect();

        // Deterministic order (stable exports & tests)
        out.sort_by(|a, b| a.path.cmp(&b.path));

        out
    }

    fn exists(
        &self,
        path: &str,
    ) -> bool
    {
        Path::new(path).exists()
    }

    fn dir_entries(
        &self,
        dir: &str,
    ) -> Vec<String>
    {
        let Ok(entries) = fs::read_dir(dir)
        else
        {
            return Vec::new();
        };

        let mut out: Vec<String> = entries
            .filter_map(|res| res.ok())
            .map(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        out.sort();

        out
    }
}
