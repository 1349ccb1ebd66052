//! End-to-end generation against in-memory fixtures

use crate::integration::test_utils::{with_env_lock, FixtureReader};
use serde_json::json;
use specgen::model::ModelKind;
use specgen::registry::RegistrationConflict;
use specgen::writer::MemorySpecWriter;
use specgen::{FeatureSpecGenerator, GenerationError, GeneratorOptions};
use std::collections::HashSet;
use std::path::Path;

fn generate(reader: &FixtureReader, options: GeneratorOptions) -> (MemorySpecWriter, usize) {
    let mut writer = MemorySpecWriter::new();
    let count = with_env_lock(|| {
        FeatureSpecGenerator::new(options, reader, &mut writer)
            .generate_specs(Path::new("/opt/server"))
            .unwrap()
    });
    (writer, count)
}

/// One subsystem, and a domain model holding exactly profile, host and one
/// domain-only resource.
#[test]
fn test_domain_children_partitioned_onto_root() {
    let reader = FixtureReader {
        standalone: json!({
            "name": "server-root",
            "children": [["subsystem.logging", { "attributes": { "level": {} } }]]
        }),
        domain: json!({
            "name": "domain-root",
            "children": [
                ["profile", { "children": [["subsystem.logging", { "attributes": { "level": {} } }]] }],
                ["host", { "attributes": { "name": {} } }],
                ["server-group", { "attributes": { "profile": {} } }]
            ]
        }),
    };

    let (writer, count) = generate(&reader, GeneratorOptions::new("out"));

    let names: HashSet<&str> = writer.specs().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        HashSet::from([
            "server-root",
            "subsystem.logging",
            "profile",
            "host",
            "domain.server-group",
        ])
    );
    assert_eq!(count, names.len());
    assert_eq!(count, writer.specs().len());

    let root = writer.get("server-root").unwrap();
    assert_eq!(
        root.models,
        vec![
            ModelKind::Standalone,
            ModelKind::Profile,
            ModelKind::Domain,
            ModelKind::Host
        ]
    );
    assert!(root.children.contains(&"domain.server-group".to_string()));
    assert!(!names.contains("domain"));
}

#[test]
fn test_full_fixture_shares_identical_handlers() {
    let (writer, count) = generate(&FixtureReader::new(), GeneratorOptions::new("out"));

    // server-root, subsystem.logging, one shared handler, subsystem.io,
    // profile, domain.server-group, host, host.subsystem.jmx
    assert_eq!(count, 8);
    assert!(writer
        .get("subsystem.logging.periodic-rotating-file-handler")
        .is_some());
    assert!(writer.get("subsystem.logging.console-handler").is_none());

    let handler = writer
        .get("subsystem.logging.periodic-rotating-file-handler")
        .unwrap();
    assert_eq!(handler.refs, vec!["subsystem.logging".to_string()]);
    assert_eq!(handler.requires.len(), 1);
    assert_eq!(handler.requires[0].provider.as_deref(), Some("subsystem.io"));

    let logging = writer.get("subsystem.logging").unwrap();
    assert_eq!(
        logging.models,
        vec![ModelKind::Standalone, ModelKind::Profile]
    );
    assert_eq!(
        logging.refs,
        vec!["profile".to_string(), "server-root".to_string()]
    );

    let jmx = writer.get("host.subsystem.jmx").unwrap();
    assert_eq!(jmx.models, vec![ModelKind::Host]);
    assert_eq!(jmx.refs, vec!["host".to_string()]);
}

#[test]
fn test_each_spec_written_once() {
    let (writer, count) = generate(&FixtureReader::new(), GeneratorOptions::new("out"));
    let unique: HashSet<&str> = writer.specs().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(unique.len(), writer.specs().len());
    assert_eq!(count, writer.specs().len());
}

#[test]
fn test_inherited_specs_excluded_from_count() {
    let mut options = GeneratorOptions::new("out");
    options.inherited = HashSet::from(["subsystem.io".to_string(), "host".to_string()]);

    let (writer, count) = generate(&FixtureReader::new(), options);

    assert_eq!(count, 6);
    assert!(writer.get("subsystem.io").is_none());
    assert!(writer.get("host").is_none());
    // Children of an inherited spec are still generated
    assert!(writer.get("host.subsystem.jmx").is_some());
    // A provider that is inherited still resolves requirements
    let handler = writer
        .get("subsystem.logging.periodic-rotating-file-handler")
        .unwrap();
    assert_eq!(handler.requires[0].provider.as_deref(), Some("subsystem.io"));
}

#[test]
fn test_unresolved_requirement_reported() {
    let reader = FixtureReader {
        standalone: json!({
            "name": "server-root",
            "children": [["subsystem.undertow", {
                "attributes": { "statistics-enabled": {} },
                "requires": [{ "name": "org.wildfly.security.ssl-context" }]
            }]]
        }),
        domain: json!({ "name": "domain-root" }),
    };
    let mut writer = MemorySpecWriter::new();
    let report = with_env_lock(|| {
        FeatureSpecGenerator::new(GeneratorOptions::new("out"), &reader, &mut writer)
            .run(Path::new("/opt/server"))
            .unwrap()
    });

    assert_eq!(report.specs_generated, 2);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].spec, "subsystem.undertow");
}

fn conflicting_reader() -> FixtureReader {
    FixtureReader {
        standalone: json!({
            "name": "server-root",
            "children": [
                ["subsystem.a", {
                    "attributes": { "x": {} },
                    "capabilities": [{ "name": "org.example.shared" }]
                }],
                ["subsystem.b", {
                    "attributes": { "y": {} },
                    "capabilities": [{ "name": "org.example.shared" }]
                }]
            ]
        }),
        domain: json!({ "name": "domain-root" }),
    }
}

#[test]
fn test_conflicts_overwrite_by_default() {
    let reader = conflicting_reader();
    let mut writer = MemorySpecWriter::new();
    let report = with_env_lock(|| {
        FeatureSpecGenerator::new(GeneratorOptions::new("out"), &reader, &mut writer)
            .run(Path::new("/opt/server"))
            .unwrap()
    });

    assert_eq!(report.specs_generated, 3);
    assert_eq!(
        report.conflicts,
        vec![RegistrationConflict::CapabilityProvider {
            capability: "org.example.shared".to_string(),
            previous: "subsystem.a".to_string(),
            replacement: "subsystem.b".to_string(),
        }]
    );
}

#[test]
fn test_conflicts_fail_in_strict_mode() {
    let reader = conflicting_reader();
    let mut writer = MemorySpecWriter::new();
    let mut options = GeneratorOptions::new("out");
    options.strict = true;

    let err = with_env_lock(|| {
        FeatureSpecGenerator::new(options, &reader, &mut writer)
            .run(Path::new("/opt/server"))
            .unwrap_err()
    });

    assert!(matches!(err, GenerationError::Conflict(_)));
    assert!(writer.specs().is_empty());
}
