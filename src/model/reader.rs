//! Model readers
//!
//! The generator never talks to a server itself. A [`ModelReader`] hands it the
//! standalone and domain descriptions. Two readers ship with the crate: one
//! that loads descriptions exported to JSON files next to the installation,
//! and one that runs an exporter program in a child process so a full server
//! boot never happens inside the generator's own process.

use crate::error::{GenerationError, ModelError};
use crate::model::RawModelDescription;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, instrument};

/// Parameters handed to a reader for a single read.
///
/// `properties` are passed explicitly instead of through the process
/// environment, so reading never has to mutate ambient state.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub fork: bool,
    pub properties: BTreeMap<String, String>,
}

/// Source of the raw model descriptions for an installation.
///
/// `ReadOptions::fork` asks for the model to be loaded outside the calling
/// process. A reader that cannot do that fails with
/// [`ModelError::ForkUnsupported`] instead of silently reading in-process.
pub trait ModelReader {
    fn read_standalone(
        &self,
        installation: &Path,
        options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError>;

    fn read_domain(
        &self,
        installation: &Path,
        options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError>;
}

/// Which reader the configuration selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderKind {
    Json,
    Command,
}

impl Default for ReaderKind {
    fn default() -> Self {
        ReaderKind::Json
    }
}

/// Reader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub kind: ReaderKind,

    /// File name of the exported standalone description (json reader)
    #[serde(default = "default_standalone_file")]
    pub standalone_file: String,

    /// File name of the exported domain description (json reader)
    #[serde(default = "default_domain_file")]
    pub domain_file: String,

    /// Exporter program (command reader, or json reader in fork mode)
    #[serde(default)]
    pub command: Option<String>,

    /// Leading arguments for the exporter program
    #[serde(default)]
    pub args: Vec<String>,

    /// Key/value parameters passed to the reader
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_standalone_file() -> String {
    "standalone-model.json".to_string()
}

fn default_domain_file() -> String {
    "domain-model.json".to_string()
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            kind: ReaderKind::default(),
            standalone_file: default_standalone_file(),
            domain_file: default_domain_file(),
            command: None,
            args: Vec::new(),
            properties: BTreeMap::new(),
        }
    }
}

impl ReaderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.kind == ReaderKind::Command && self.command.is_none() {
            return Err("reader.kind = \"command\" requires reader.command".to_string());
        }
        if self.standalone_file.is_empty() || self.domain_file.is_empty() {
            return Err("Model description file names cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Build the reader selected by `config`.
///
/// Fork mode always means a child process, so a json reader configured with
/// `fork` switches to the exporter command and fails if none is configured.
pub fn reader_from_config(
    config: &ReaderConfig,
    fork: bool,
) -> Result<Box<dyn ModelReader>, GenerationError> {
    match (config.kind, fork) {
        (ReaderKind::Json, false) => Ok(Box::new(JsonModelReader::with_files(
            config.standalone_file.clone(),
            config.domain_file.clone(),
        ))),
        (ReaderKind::Json, true) | (ReaderKind::Command, _) => {
            let command = config.command.clone().ok_or_else(|| {
                GenerationError::ConfigError(
                    "Fork mode requires an exporter command (reader.command)".to_string(),
                )
            })?;
            Ok(Box::new(CommandModelReader::new(command, config.args.clone())))
        }
    }
}

/// Loads descriptions previously exported as JSON files into the installation.
#[derive(Debug, Clone)]
pub struct JsonModelReader {
    standalone_file: String,
    domain_file: String,
}

impl Default for JsonModelReader {
    fn default() -> Self {
        Self::with_files(default_standalone_file(), default_domain_file())
    }
}

impl JsonModelReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(standalone_file: String, domain_file: String) -> Self {
        Self {
            standalone_file,
            domain_file,
        }
    }

    fn read_file(
        &self,
        path: PathBuf,
        options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        if options.fork {
            return Err(ModelError::ForkUnsupported("json".to_string()));
        }
        if !path.is_file() {
            return Err(ModelError::NotFound(path));
        }
        let bytes = std::fs::read(&path).map_err(|source| ModelError::Read {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "Read model description");
        RawModelDescription::from_json_slice(&bytes, &path.display().to_string())
    }
}

impl ModelReader for JsonModelReader {
    fn read_standalone(
        &self,
        installation: &Path,
        options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        self.read_file(installation.join(&self.standalone_file), options)
    }

    fn read_domain(
        &self,
        installation: &Path,
        options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        self.read_file(installation.join(&self.domain_file), options)
    }
}

/// Runs an exporter program in a child process and parses its stdout.
///
/// Invocation: `<program> <args..> <standalone|domain> <installation>`, with
/// the read properties set in the child's environment only. The model is
/// always loaded out of process, so both values of `fork` are satisfied.
#[derive(Debug, Clone)]
pub struct CommandModelReader {
    program: String,
    args: Vec<String>,
}

impl CommandModelReader {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    #[instrument(skip(self, options), fields(program = %self.program))]
    fn export(
        &self,
        model: &str,
        installation: &Path,
        options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        info!(installation = %installation.display(), fork = options.fork, "Exporting {} model", model);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(model)
            .arg(installation)
            .envs(&options.properties)
            .output()
            .map_err(|source| ModelError::ExporterSpawn {
                command: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ModelError::ExporterFailed {
                command: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        RawModelDescription::from_json_slice(
            &output.stdout,
            &format!("{} {}", self.program, model),
        )
    }
}

impl ModelReader for CommandModelReader {
    fn read_standalone(
        &self,
        installation: &Path,
        options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        self.export("standalone", installation, options)
    }

    fn read_domain(
        &self,
        installation: &Path,
        options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        self.export("domain", installation, options)
    }
}
