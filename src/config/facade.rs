//! Config loading entry points

use super::merge_policy;
use super::sources::{global_file, project_file};
use super::SpecGenConfig;
use config::{ConfigBuilder, ConfigError, Environment, File};
use std::path::Path;
use tracing::debug;

/// Loads [`SpecGenConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load using the global file and `specgen.toml` under `project_root`.
    pub fn load(project_root: &Path) -> Result<SpecGenConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = project_file::add_to_builder(builder, project_root)?;
        Self::finish(builder)
    }

    /// Load from an explicit file, skipping the global and project files.
    pub fn load_from_file(path: &Path) -> Result<SpecGenConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    /// Built-in defaults only
    pub fn default() -> SpecGenConfig {
        SpecGenConfig::default()
    }

    fn finish(
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<SpecGenConfig, ConfigError> {
        let config: SpecGenConfig = builder
            .add_source(
                Environment::with_prefix("SPECGEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        debug!(output = %config.output_dir.display(), "Configuration loaded");
        Ok(config)
    }
}
