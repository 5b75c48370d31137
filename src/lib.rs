//! **patchup** - CLI for exporting patch sets of sources and build artifacts from project build units
//!
//! Normalizes an arbitrary, overlapping selection of files/directories into a canonical
//! file list, maps every file to zero or more destinations (structured mirror of the
//! content root plus compiled-artifact fan-out under `codebase/`), and copies the result.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core engine - selection normalization and path mapping
pub mod core {
    /// Selection normalization: directory collapse + recursive expansion
    pub mod normalize;
    pub use normalize::{normalize, subsumes};

    /// Compiled-artifact candidate matching (synthetic-unit fan-out)
    pub mod artifacts;
    pub use artifacts::ArtifactMatcher;

    /// Build units and selection-to-unit resolution
    pub mod unit;
    pub use unit::{BuildUnit, ModuleResolver, run as unit_run};

    /// Path mapping: (source, destination) pair computation
    pub mod mapper;
    pub use mapper::{MapError, MappingRules, PathMapper, PathResult};

    /// Export orchestration and the copy executor
    pub mod export;
    pub use export::run as export_run;
}

/// Infrastructure - configuration, filesystem boundary, preferences
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Filesystem boundary (`FileNode`, `Vfs`, `RealFs`)
    pub mod vfs;
    pub use vfs::{FileNode, RealFs, Vfs};

    /// Remembered per-unit export destinations
    pub mod prefs;
    pub use prefs::ExportPaths;
}

// Strategic re-exports for clean CLI interface
pub use crate::cli::{AppContext, Cli, Commands};
pub use crate::core::{export_run, unit_run};
pub use crate::infra::{Config, load_config};

// Core types for external consumers
pub use crate::core::{BuildUnit, MapError, PathResult};
pub use crate::infra::{FileNode, RealFs, Vfs};
