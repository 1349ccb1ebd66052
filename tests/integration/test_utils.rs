//! Shared test utilities for integration tests
//!
//! Generation runs capture and restore the whole process environment, so every
//! test that runs the generator or touches environment variables goes through
//! [`with_env_lock`].

use serde_json::{json, Value};
use specgen::model::{ModelReader, RawModelDescription, ReadOptions};
use specgen::ModelError;
use std::path::Path;
use std::sync::Mutex;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` while holding the process-wide environment lock.
pub fn with_env_lock<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    f()
}

/// Standalone model with a logging and an io subsystem.
pub fn standalone_model() -> Value {
    json!({
        "name": "server-root",
        "attributes": { "name": {}, "organization": {} },
        "children": [
            ["subsystem.logging", {
                "attributes": { "add-logging-api-dependencies": {} },
                "capabilities": [{ "name": "org.wildfly.logging" }],
                "children": [
                    ["periodic-rotating-file-handler", {
                        "attributes": { "file": {}, "level": {}, "suffix": {} },
                        "requires": [{ "name": "org.wildfly.io.worker" }]
                    }],
                    ["console-handler", {
                        "attributes": { "file": {}, "level": {}, "suffix": {} },
                        "requires": [{ "name": "org.wildfly.io.worker" }]
                    }]
                ]
            }],
            ["subsystem.io", {
                "capabilities": [{ "name": "org.wildfly.io.worker", "dynamic": true }],
                "attributes": { "io-threads": {} }
            }]
        ]
    })
}

/// Domain model with a profile, a host and one domain-only resource.
pub fn domain_model() -> Value {
    json!({
        "name": "domain-root",
        "children": [
            ["profile", {
                "attributes": { "includes": {} },
                "children": [
                    ["subsystem.logging", {
                        "attributes": { "add-logging-api-dependencies": {} },
                        "capabilities": [{ "name": "org.wildfly.logging" }]
                    }]
                ]
            }],
            ["host", {
                "attributes": { "name": {} },
                "children": [
                    ["subsystem.jmx", { "attributes": { "non-core-mbean-sensitivity": {} } }]
                ]
            }],
            ["server-group", {
                "attributes": { "profile": {}, "socket-binding-group": {} },
                "requires": [{ "name": "org.wildfly.domain.profile", "optional": true }]
            }]
        ]
    })
}

/// Serves fixed JSON documents.
pub struct FixtureReader {
    pub standalone: Value,
    pub domain: Value,
}

impl FixtureReader {
    pub fn new() -> Self {
        Self {
            standalone: standalone_model(),
            domain: domain_model(),
        }
    }
}

impl ModelReader for FixtureReader {
    fn read_standalone(
        &self,
        _installation: &Path,
        _options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        RawModelDescription::from_json_slice(self.standalone.to_string().as_bytes(), "fixture")
    }

    fn read_domain(
        &self,
        _installation: &Path,
        _options: &ReadOptions,
    ) -> Result<RawModelDescription, ModelError> {
        RawModelDescription::from_json_slice(self.domain.to_string().as_bytes(), "fixture")
    }
}

/// Write the fixture models where the json reader expects them.
pub fn write_installation(dir: &Path) {
    std::fs::write(
        dir.join("standalone-model.json"),
        serde_json::to_vec_pretty(&standalone_model()).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.join("domain-model.json"),
        serde_json::to_vec_pretty(&domain_model()).unwrap(),
    )
    .unwrap();
}
