//! Environment isolation of generation runs
//!
//! Readers are free to change process environment variables. Whatever they
//! do, the environment after a run equals the environment before it.

use crate::integration::test_utils::{domain_model, standalone_model, with_env_lock};
use specgen::model::{ModelReader, RawModelDescription, ReadOptions};
use specgen::writer::MemorySpecWriter;
use specgen::{FeatureSpecGenerator, GenerationError, GeneratorOptions, ModelError};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const CHANGED: &str = "SPECGEN_IT_CHANGED";
const ADDED: &str = "SPECGEN_IT_ADDED";
const REMOVED: &str = "SPECGEN_IT_REMOVED";

/// Mutates the environment while reading, then optionally fails.
struct MutatingReader {
    fail_domain: bool,
}

impl MutatingReader {
    fn mutate() {
        std::env::set_var(CHANGED, "changed-by-reader");
        std::env::set_var(ADDED, "added-by-reader");
        std::env::remove_var(REMOVED);
    }
}

impl ModelReader for MutatingReader {
    fn read_standalone(
        &self,
        _installation: &Path,
        _options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        Self::mutate();
        RawModelDescription::from_json_slice(standalone_model().to_string().as_bytes(), "mutating")
    }

    fn read_domain(
        &self,
        _installation: &Path,
        _options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        if self.fail_domain {
            return Err(ModelError::NotFound(PathBuf::from("domain-model.json")));
        }
        RawModelDescription::from_json_slice(domain_model().to_string().as_bytes(), "mutating")
    }
}

fn snapshot() -> HashMap<OsString, OsString> {
    std::env::vars_os().collect()
}

fn prepare_env() {
    std::env::set_var(CHANGED, "original");
    std::env::set_var(REMOVED, "present");
    std::env::remove_var(ADDED);
}

fn cleanup_env() {
    std::env::remove_var(CHANGED);
    std::env::remove_var(REMOVED);
    std::env::remove_var(ADDED);
}

#[test]
fn test_environment_restored_after_success() {
    with_env_lock(|| {
        prepare_env();
        let before = snapshot();

        let reader = MutatingReader { fail_domain: false };
        let mut writer = MemorySpecWriter::new();
        let count = FeatureSpecGenerator::new(GeneratorOptions::new("out"), &reader, &mut writer)
            .generate_specs(Path::new("/opt/server"))
            .unwrap();

        assert_eq!(count, 8);
        assert_eq!(before, snapshot());
        assert_eq!(std::env::var(CHANGED).unwrap(), "original");
        assert_eq!(std::env::var(REMOVED).unwrap(), "present");
        assert!(std::env::var_os(ADDED).is_none());
        cleanup_env();
    });
}

#[test]
fn test_environment_restored_after_failure() {
    with_env_lock(|| {
        prepare_env();
        let before = snapshot();

        let reader = MutatingReader { fail_domain: true };
        let mut writer = MemorySpecWriter::new();
        let err = FeatureSpecGenerator::new(GeneratorOptions::new("out"), &reader, &mut writer)
            .generate_specs(Path::new("/opt/server"))
            .unwrap_err();

        assert!(matches!(err, GenerationError::Model(ModelError::NotFound(_))));
        assert!(writer.specs().is_empty());
        assert_eq!(before, snapshot());
        cleanup_env();
    });
}

#[test]
fn test_properties_reach_reader_without_touching_environment() {
    struct PropertyReader;

    impl ModelReader for PropertyReader {
        fn read_standalone(
            &self,
            _installation: &Path,
            options: &ReadOptions,
        ) -> Result<RawModelDescription, ModelError> {
            let name = options
                .properties
                .get("root.name")
                .cloned()
                .unwrap_or_else(|| "missing".to_string());
            Ok(RawModelDescription::named(name))
        }

        fn read_domain(
            &self,
            _installation: &Path,
            _options: &ReadOptions,
        ) -> Result<RawModelDescription, ModelError> {
            Ok(RawModelDescription::named("domain-root"))
        }
    }

    with_env_lock(|| {
        let before = snapshot();
        let mut options = GeneratorOptions::new("out");
        options
            .properties
            .insert("root.name".to_string(), "configured-root".to_string());

        let mut writer = MemorySpecWriter::new();
        FeatureSpecGenerator::new(options, &PropertyReader, &mut writer)
            .generate_specs(Path::new("/opt/server"))
            .unwrap();

        assert!(writer.get("configured-root").is_some());
        assert_eq!(before, snapshot());
    });
}
