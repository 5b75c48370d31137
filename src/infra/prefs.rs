//! Filepath: src/infra/prefs.rs
//! Remembered export destinations, one per build unit.
//!
//! Read before defaulting a destination, written after a successful
//! export. Stored as TOML under `.patchup/export-paths.toml` in the
//! working directory; a missing or unreadable store is an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

const STORE_DIR: &str = ".patchup";
const STORE_FILE: &str = "export-paths.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile
{
    #[serde(default)]
    exports: IndexMap<String, String>,
}

/// Unit-name to last-used destination map.
#[derive(Debug)]
pub struct ExportPaths
{
    path: PathBuf,
    map: IndexMap<String, String>,
}

impl ExportPaths
{
    /// Load the store rooted at `base` (usually the working directory).
    pub fn load(base: &Path) -> Self
    {
        let path = base
            .join(STORE_DIR)
            .join(STORE_FILE);

        let map = fs::read_to_string(&path)
            .ok()
            .and_then(|text| {
                toml::from_str::<StoreFile>(&text)
                    .map_err(|err| {
                        debug!(?err, "ignoring malformed export-path store");
                        err
                    })
                    .ok()
            })
            .map(|store| store.exports)
            .unwrap_or_default();

        Self { path, map }
    }

    pub fn get(
        &self,
        unit: &str,
    ) -> Option<&str>
    {
        self.map
            .get(unit)
            .map(String::as_str)
    }

    /// Record `dest` for `unit` and persist the store.
    pub fn remember(
        &mut self,
        unit: &str,
        dest: &str,
    ) -> Result<()>
    {
        self.map
            .insert(unit.to_string(), dest.to_string());

        if let Some(parent) = self
            .path
            .parent()
        {
            fs::create_dir_all(parent).context("create preference directory")?;
        }

        let store = StoreFile { exports: self.map.clone() };
        let text = toml::to_string_pretty(&store).context("serialize export-path store")?;
        fs::write(&self.path, text).context("write export-path store")?;

        Ok(())
    }
}
