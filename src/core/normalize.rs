//! Selection normalization: collapse an overlapping, possibly duplicated
//! selection of files and directories into a canonical, fully-expanded
//! file list ready for path mapping.
//!
//! Two passes:
//! 1. Directory collapse — a selected directory is dropped when any other
//!    selected node lies beneath it (the descendant wins).
//! 2. Recursive expansion — surviving directories are expanded to their
//!    files; empty directories stay in the output as placeholders so the
//!    executor can still materialize them at the destination.

use indexmap::{IndexMap, IndexSet};

use crate::infra::vfs::{FileNode, Vfs};

/// Containment test used by the directory-collapse pass.
///
/// Deliberately a raw substring match, not a path-segment comparison:
/// `/p/build2/x` counts as subsumed by `/p/build`. This mirrors the
/// long-standing behavior exports were built against; every caller goes
/// through this single predicate so a segment-boundary version can be
/// swapped in without touching the collapse algorithm.
pub fn subsumes(path: &str, dir_path: &str) -> bool {
    path.contains(dir_path) && path != dir_path
}

/// Collapse and expand a raw selection into an ordered, duplicate-free
/// file list.
///
/// Order is first-seen order of the raw selection (and of directory
/// children during expansion). Selecting a directory together with one of
/// its descendants drops the directory entirely: only the explicitly
/// selected descendant survives for that subtree.
pub fn normalize(selection: &[FileNode], vfs: &dyn Vfs) -> Vec<FileNode> {
    let survivors = collapse_directories(selection);

    let mut seen: IndexMap<String, FileNode> = IndexMap::new();
    for node in &survivors {
        expand(node, vfs, &mut seen);
    }

    seen.into_values().collect()
}

/// Pass 1: drop every selected directory that another selected node
/// lies beneath.
fn collapse_directories(selection: &[FileNode]) -> Vec<FileNode> {
    let mut dirs: IndexSet<&str> = IndexSet::new();
    for node in selection {
        if node.is_dir {
            dirs.insert(node.path.as_str());
        }
    }

    let mut working: Vec<FileNode> = selection.to_vec();
    for node in selection {
        for dir_path in &dirs {
            if subsumes(&node.path, dir_path) {
                working.retain(|n| n.path != *dir_path);
            }
        }
    }

    working
}

/// Pass 2: files append once (first-seen order); directories recurse into
/// their children, or append themselves when they have none.
fn expand(node: &FileNode, vfs: &dyn Vfs, seen: &mut IndexMap<String, FileNode>) {
    if node.is_dir {
        let children = vfs.children(node);
        if children.is_empty() {
            // Empty-directory placeholder
            seen.entry(node.path.clone()).or_insert_with(|| node.clone());
            return;
        }
        for child in &children {
            expand(child, vfs, seen);
        }
    } else {
        seen.entry(node.path.clone()).or_insert_with(|| node.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::infra::vfs::{RealFs, node_path};

    use super::*;

    fn write_file(root: &Path, rel: &str) -> anyhow::Result<()> {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "x")?;
        Ok(())
    }

    fn rel_names(root: &Path, nodes: &[FileNode]) -> Vec<String> {
        let prefix = format!("{}/", node_path(root));
        nodes
            .iter()
            .map(|n| n.path.replace(&prefix, ""))
            .collect()
    }

    #[test]
    fn subsumes_is_substring_based() {
        assert!(subsumes("/p/build/x.txt", "/p/build"));
        assert!(!subsumes("/p/build", "/p/build"));
        // Documented precision defect: sibling names sharing a prefix
        // are treated as nested.
        assert!(subsumes("/p/build2/x.txt", "/p/build"));
    }

    #[test]
    fn directory_collapse_keeps_only_selected_descendant() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "d/f.txt")?;
        write_file(root, "d/g.txt")?;

        let d = FileNode::dir(node_path(&root.join("d")));
        let f = FileNode::file(node_path(&root.join("d/f.txt")));

        let out = normalize(&[d, f], &RealFs);

        // D is dropped entirely; G is unreachable for this export.
        assert_eq!(rel_names(root, &out), vec!["d/f.txt"]);
        Ok(())
    }

    #[test]
    fn directory_alone_expands_to_all_files() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "d/a.txt")?;
        write_file(root, "d/sub/b.txt")?;

        let d = FileNode::dir(node_path(&root.join("d")));
        let out = normalize(&[d], &RealFs);

        assert_eq!(rel_names(root, &out), vec!["d/a.txt", "d/sub/b.txt"]);
        assert!(out.iter().all(|n| !n.is_dir));
        Ok(())
    }

    #[test]
    fn nested_directory_selection_drops_the_outer_one() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "d/a.txt")?;
        write_file(root, "d/sub/b.txt")?;

        let outer = FileNode::dir(node_path(&root.join("d")));
        let inner = FileNode::dir(node_path(&root.join("d/sub")));

        let out = normalize(&[outer, inner], &RealFs);

        // Only the inner directory is operative; d/a.txt is not exported.
        assert_eq!(rel_names(root, &out), vec!["d/sub/b.txt"]);
        Ok(())
    }

    #[test]
    fn empty_directory_is_preserved_as_placeholder() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        fs::create_dir_all(root.join("empty"))?;

        let e = FileNode::dir(node_path(&root.join("empty")));
        let out = normalize(std::slice::from_ref(&e), &RealFs);

        assert_eq!(out, vec![e]);
        Ok(())
    }

    #[test]
    fn duplicates_are_removed_in_first_seen_order() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "a.txt")?;
        write_file(root, "b.txt")?;

        let a = FileNode::file(node_path(&root.join("a.txt")));
        let b = FileNode::file(node_path(&root.join("b.txt")));

        let out = normalize(&[b.clone(), a.clone(), b.clone()], &RealFs);

        assert_eq!(out, vec![b, a]);
        Ok(())
    }

    #[test]
    fn normalize_is_idempotent() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "d/a.txt")?;
        write_file(root, "d/sub/b.txt")?;
        fs::create_dir_all(root.join("empty"))?;

        let selection = vec![
            FileNode::dir(node_path(&root.join("d"))),
            FileNode::file(node_path(&root.join("d/a.txt"))),
            FileNode::dir(node_path(&root.join("empty"))),
        ];

        let once = normalize(&selection, &RealFs);
        let twice = normalize(&once, &RealFs);

        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn missing_directory_yields_placeholder_not_error() {
        // An unreadable/missing directory degrades to "no children",
        // which the expansion treats as an empty directory.
        let ghost = FileNode::dir("/no/such/dir");
        let out = normalize(std::slice::from_ref(&ghost), &RealFs);
        assert_eq!(out, vec![ghost]);
    }
}
