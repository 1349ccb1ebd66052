//! CLI route: single route table and run context.

use crate::branch::branch_id;
use crate::config::{ConfigLoader, SpecGenConfig};
use crate::error::GenerationError;
use crate::generator::FeatureSpecGenerator;
use crate::model::reader_from_config;
use crate::writer::{JsonSpecWriter, MemorySpecWriter, SpecWriter};
use std::path::PathBuf;
use tracing::info;

use crate::cli::parse::{Commands, GenerateArgs};
use crate::cli::presentation::{format_report_json, format_report_text};

/// Runtime context for CLI execution: project directory and loaded configuration.
pub struct RunContext {
    project_root: PathBuf,
    config: SpecGenConfig,
}

impl RunContext {
    /// Create run context from the project directory and optional config path.
    pub fn new(project_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, GenerationError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&project_root)?
        };
        Ok(Self::with_config(project_root, config))
    }

    pub fn with_config(project_root: PathBuf, config: SpecGenConfig) -> Self {
        Self {
            project_root,
            config,
        }
    }

    pub fn config(&self) -> &SpecGenConfig {
        &self.config
    }

    /// Execute a command and return its printable output.
    pub fn execute(&self, command: &Commands) -> Result<String, GenerationError> {
        match command {
            Commands::Generate(args) => self.generate(args),
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| GenerationError::Render(e.to_string())),
            Commands::Branch { name, dots } => Ok(branch_id(name, *dots).to_string()),
        }
    }

    fn generate(&self, args: &GenerateArgs) -> Result<String, GenerationError> {
        let config = self.effective_config(args);
        let options = config.generator_options()?;
        let installation = dunce::canonicalize(&args.installation).map_err(|e| {
            GenerationError::ConfigError(format!(
                "Installation {:?} not accessible: {}",
                args.installation, e
            ))
        })?;
        let reader = reader_from_config(&config.reader, config.fork)?;

        let mut json_writer = JsonSpecWriter::new();
        let mut memory_writer = MemorySpecWriter::new();
        let writer: &mut dyn SpecWriter = if args.dry_run {
            &mut memory_writer
        } else {
            &mut json_writer
        };

        info!(installation = %installation.display(), dry_run = args.dry_run, "Generating specs");
        let output_dir = options.output_dir.clone();
        let report = FeatureSpecGenerator::new(options, reader.as_ref(), writer).run(&installation)?;

        match args.format.as_str() {
            "json" => format_report_json(&report),
            _ => Ok(format_report_text(&report, &output_dir, args.dry_run)),
        }
    }

    /// Apply command line overrides on top of the loaded configuration.
    /// A relative output directory is resolved against the project directory.
    fn effective_config(&self, args: &GenerateArgs) -> SpecGenConfig {
        let mut config = self.config.clone();
        if let Some(ref output) = args.output {
            config.output_dir = output.clone();
        }
        if config.output_dir.is_relative() {
            config.output_dir = self.project_root.join(&config.output_dir);
        }
        config.inherited.specs.extend(args.inherit.iter().cloned());
        config
            .inherited
            .feature_packs
            .extend(args.feature_packs.iter().cloned());
        config.fork |= args.fork;
        config.debug |= args.debug;
        config.strict |= args.strict;
        config
    }
}
