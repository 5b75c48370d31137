use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::mapper::MappingRules;
use crate::core::unit::BuildUnit;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config
{
    /// Build-configuration file names excluded from structured export
    pub exclude_files: Vec<String>,

    /// Pattern extracting a unit root from a selected path; capture 1 is
    /// the unit directory, capture 3 the unit-name segment
    pub unit_root_pattern: String,

    /// Default destination when no --dest is given and nothing is remembered
    pub default_dest: String,

    /// Artifact naming knobs
    pub mapping: MappingConfig,

    /// Known build units
    pub units: Vec<UnitConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingConfig
{
    pub source_ext: String,
    pub descriptor_ext: String,
    pub artifact_ext: String,
    pub synthetic_marker: String,
    pub non_compilable_prefix: String,
    pub codebase_dir: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnitConfig
{
    pub name: String,
    pub content_root: String,
    pub source_roots: Vec<String>,

    #[serde(default)]
    pub test_roots: Vec<String>,

    /// Absent until a build has produced output
    #[serde(default)]
    pub output_root: Option<String>,

    /// Defaults to the content root
    #[serde(default)]
    pub unit_dir: Option<String>,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            exclude_files: vec![
                "custom-actionModels.xml".to_string(),
                "custom-actions.xml".to_string(),
                "custom.xml".to_string(),
                "mvc.xml".to_string(),
            ],
            unit_root_pattern: "((.+)/(.+))/(src|WebRoot)/.*".to_string(),
            default_dest: "~/Desktop".to_string(),
            mapping: MappingConfig {
                source_ext: "java".to_string(),
                descriptor_ext: "xml".to_string(),
                artifact_ext: ".class".to_string(),
                synthetic_marker: "$".to_string(),
                non_compilable_prefix: "_".to_string(),
                codebase_dir: "codebase".to_string(),
            },
            units: Vec::new(),
        }
    }
}

impl Config
{
    /// Mapping knobs in the form the engine consumes.
    pub fn rules(&self) -> MappingRules
    {
        MappingRules {
            exclude_files: self
                .exclude_files
                .iter()
                .cloned()
                .collect::<IndexSet<String>>(),
            source_ext: self
                .mapping
                .source_ext
                .clone(),
            descriptor_ext: self
                .mapping
                .descriptor_ext
                .clone(),
            artifact_ext: self
                .mapping
                .artifact_ext
                .clone(),
            synthetic_marker: self
                .mapping
                .synthetic_marker
                .clone(),
            non_compilable_prefix: self
                .mapping
                .non_compilable_prefix
                .clone(),
            codebase_dir: self
                .mapping
                .codebase_dir
                .clone(),
        }
    }

    /// Configured units as engine `BuildUnit`s.
    pub fn build_units(&self) -> Vec<BuildUnit>
    {
        self.units
            .iter()
            .map(|u| BuildUnit {
                name: u
                    .name
                    .clone(),
                content_root: u
                    .content_root
                    .clone(),
                source_roots: u
                    .source_roots
                    .clone(),
                test_roots: u
                    .test_roots
                    .clone(),
                compiled_output: u
                    .output_root
                    .clone(),
                unit_dir: u
                    .unit_dir
                    .clone()
                    .unwrap_or_else(|| {
                        u.content_root
                            .clone()
                    }),
            })
            .collect()
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["patchup.toml", ".patchup.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with PATCHUP_ prefix
    builder = builder.add_source(config::Environment::with_prefix("PATCHUP").separator("_"));

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("patchup.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn default_exclusions_match_known_build_config_files()
    {
        let config = Config::default();
        let rules = config.rules();

        assert!(
            rules
                .exclude_files
                .contains("mvc.xml")
        );
        assert!(
            rules
                .exclude_files
                .contains("custom.xml")
        );
        assert_eq!(rules.source_ext, "java");
        assert_eq!(rules.artifact_ext, ".class");
    }

    #[test]
    fn unit_dir_defaults_to_content_root()
    {
        let mut config = Config::default();
        config
            .units
            .push(UnitConfig {
                name: "app".to_string(),
                content_root: "/code/app".to_string(),
                source_roots: vec!["/code/app/src".to_string()],
                test_roots: Vec::new(),
                output_root: None,
                unit_dir: None,
            });

        let units = config.build_units();
        assert_eq!(units[0].unit_dir, "/code/app");
    }

    #[test]
    fn default_config_round_trips_through_toml() -> Result<()>
    {
        let config = Config::default();
        let text = toml::to_string_pretty(&config)?;
        let back: Config = toml::from_str(&text)?;

        assert_eq!(back.exclude_files, config.exclude_files);
        assert_eq!(back.unit_root_pattern, config.unit_root_pattern);
        Ok(())
    }
}
