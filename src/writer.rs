//! Spec writers
//!
//! A [`SpecWriter`] persists finalized specs. [`JsonSpecWriter`] lays them out
//! as `{output}/{spec name}/spec.json`; [`MemorySpecWriter`] keeps them in
//! memory for dry runs.

use crate::error::StorageError;
use crate::spec::FeatureSpec;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SPEC_FILE_NAME: &str = "spec.json";

/// Persists one finalized spec per call.
pub trait SpecWriter {
    fn write(&mut self, spec: &FeatureSpec, output_dir: &Path) -> Result<(), StorageError>;
}

/// Writes each spec as pretty-printed JSON in its own directory.
#[derive(Debug, Default)]
pub struct JsonSpecWriter;

impl JsonSpecWriter {
    pub fn new() -> Self {
        Self
    }

    /// Location of the artifact for `name` under `output_dir`.
    pub fn spec_path(output_dir: &Path, name: &str) -> Result<PathBuf, StorageError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(output_dir.join(name).join(SPEC_FILE_NAME))
    }
}

impl SpecWriter for JsonSpecWriter {
    /// Write to a temporary file first, then rename into place.
    fn write(&mut self, spec: &FeatureSpec, output_dir: &Path) -> Result<(), StorageError> {
        let spec_path = Self::spec_path(output_dir, &spec.name)?;
        let temp_path = spec_path.with_extension("json.tmp");

        if let Some(parent) = spec_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create spec directory {:?}: {}", parent, e),
                ))
            })?;
        }

        let serialized =
            serde_json::to_vec_pretty(spec).map_err(|source| StorageError::Serialize {
                name: spec.name.clone(),
                source,
            })?;

        fs::write(&temp_path, &serialized).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to write spec to {:?}: {}", temp_path, e),
            ))
        })?;

        fs::rename(&temp_path, &spec_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file to {:?}: {}", spec_path, e),
            ))
        })?;

        debug!(spec = %spec.name, path = %spec_path.display(), "Wrote spec");
        Ok(())
    }
}

/// Collects specs in memory, in write order.
#[derive(Debug, Default)]
pub struct MemorySpecWriter {
    specs: Vec<FeatureSpec>,
}

impl MemorySpecWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&FeatureSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn into_specs(self) -> Vec<FeatureSpec> {
        self.specs
    }
}

impl SpecWriter for MemorySpecWriter {
    fn write(&mut self, spec: &FeatureSpec, _output_dir: &Path) -> Result<(), StorageError> {
        self.specs.push(spec.clone());
        Ok(())
    }
}
