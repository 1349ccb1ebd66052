//! Configuration System
//!
//! Layered configuration for generation runs. Sources, lowest to highest
//! precedence: built-in defaults, the global file
//! (`$XDG_CONFIG_HOME/specgen/config.toml`), the project file
//! (`specgen.toml`) or an explicit `--config` file, then `SPECGEN__*`
//! environment variables. CLI flags are applied on top by the caller.

use crate::error::GenerationError;
use crate::generator::GeneratorOptions;
use crate::inherited::collect_inherited;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::model::reader::{ReaderConfig, ReaderKind};

mod facade;
mod merge_policy;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecGenConfig {
    /// Directory the specs are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Specs supplied by base feature packs
    #[serde(default)]
    pub inherited: InheritedConfig,

    /// Read the model in an isolated process
    #[serde(default)]
    pub fork: bool,

    /// Report every expansion decision
    #[serde(default)]
    pub debug: bool,

    /// Fail on registration conflicts instead of overwriting
    #[serde(default)]
    pub strict: bool,

    /// Branch depth scoping spec sharing
    #[serde(default = "default_branch_depth")]
    pub branch_depth: usize,

    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Inherited spec sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InheritedConfig {
    /// Spec names listed explicitly
    #[serde(default)]
    pub specs: Vec<String>,

    /// Feature pack directories scanned for spec directories
    #[serde(default)]
    pub feature_packs: Vec<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("feature-specs")
}

fn default_branch_depth() -> usize {
    1
}

impl Default for SpecGenConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            inherited: InheritedConfig::default(),
            fork: false,
            debug: false,
            strict: false,
            branch_depth: default_branch_depth(),
            reader: ReaderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Output(String),
    Reader(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Output(msg) => write!(f, "Output: {}", msg),
            ValidationError::Reader(msg) => write!(f, "Reader: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SpecGenConfig {
    /// Validate the entire configuration, reporting every problem found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.output_dir.as_os_str().is_empty() {
            errors.push(ValidationError::Output(
                "Output directory cannot be empty".to_string(),
            ));
        }
        if let Err(e) = self.reader.validate() {
            errors.push(ValidationError::Reader(e));
        }
        if self.fork && self.reader.command.is_none() {
            errors.push(ValidationError::Reader(
                "fork requires reader.command".to_string(),
            ));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and turn into generator options, scanning inherited feature packs.
    pub fn generator_options(&self) -> Result<GeneratorOptions, GenerationError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            GenerationError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        let inherited = collect_inherited(
            &self.inherited.specs,
            &self.inherited.feature_packs,
        )?;

        let mut options = GeneratorOptions::new(self.output_dir.clone());
        options.inherited = inherited.into_iter().collect();
        options.fork = self.fork;
        options.debug = self.debug;
        options.strict = self.strict;
        options.branch_depth = self.branch_depth;
        options.properties = self.reader.properties.clone();
        Ok(options)
    }
}
