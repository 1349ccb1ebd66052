//! CLI route: generate from a project directory

use crate::integration::test_utils::{with_env_lock, write_installation};
use clap::Parser;
use serde_json::Value;
use specgen::cli::{Cli, Commands, GenerateArgs, RunContext};
use specgen::writer::SPEC_FILE_NAME;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn project_with_config(contents: &str) -> TempDir {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("specgen.toml"), contents).unwrap();
    project
}

fn generate_args(installation: PathBuf) -> GenerateArgs {
    GenerateArgs {
        installation,
        format: "json".to_string(),
        ..GenerateArgs::default()
    }
}

#[test]
fn test_generate_uses_project_config() {
    let project = project_with_config(
        r#"
output_dir = "specs"

[inherited]
specs = ["host"]
"#,
    );
    let installation = TempDir::new().unwrap();
    write_installation(installation.path());

    let output = with_env_lock(|| {
        let ctx = RunContext::new(project.path().to_path_buf(), None).unwrap();
        ctx.execute(&Commands::Generate(generate_args(
            installation.path().to_path_buf(),
        )))
        .unwrap()
    });

    let report: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["specs_generated"], 7);
    assert_eq!(report["inherited_skipped"], serde_json::json!(["host"]));

    let specs = project.path().join("specs");
    assert!(specs.join("server-root").join(SPEC_FILE_NAME).is_file());
    assert!(!specs.join("host").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let project = project_with_config("output_dir = \"specs\"\n");
    let installation = TempDir::new().unwrap();
    write_installation(installation.path());

    let output = with_env_lock(|| {
        let ctx = RunContext::new(project.path().to_path_buf(), None).unwrap();
        let mut args = generate_args(installation.path().to_path_buf());
        args.dry_run = true;
        args.format = "text".to_string();
        ctx.execute(&Commands::Generate(args)).unwrap()
    });

    assert!(output.contains("Dry run"));
    assert!(output.contains("Specs generated"));
    assert!(!project.path().join("specs").exists());
}

#[test]
fn test_output_flag_overrides_config() {
    let project = project_with_config("output_dir = \"specs\"\n");
    let installation = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    write_installation(installation.path());

    with_env_lock(|| {
        let ctx = RunContext::new(project.path().to_path_buf(), None).unwrap();
        let mut args = generate_args(installation.path().to_path_buf());
        args.output = Some(elsewhere.path().to_path_buf());
        ctx.execute(&Commands::Generate(args)).unwrap()
    });

    assert!(elsewhere
        .path()
        .join("subsystem.io")
        .join(SPEC_FILE_NAME)
        .is_file());
    assert!(!project.path().join("specs").exists());
}

#[test]
fn test_fork_without_command_is_rejected() {
    let project = project_with_config("fork = true\n");
    let installation = TempDir::new().unwrap();
    write_installation(installation.path());

    let result = with_env_lock(|| {
        let ctx = RunContext::new(project.path().to_path_buf(), None).unwrap();
        ctx.execute(&Commands::Generate(generate_args(
            installation.path().to_path_buf(),
        )))
    });

    assert!(result.is_err());
}

#[test]
fn test_cli_parses_generate_flags() {
    let cli = Cli::try_parse_from([
        "specgen",
        "generate",
        "--installation",
        "/opt/server",
        "--inherit",
        "host",
        "--inherit",
        "profile",
        "--strict",
        "--dry-run",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    match cli.command {
        Commands::Generate(args) => {
            assert_eq!(args.installation, PathBuf::from("/opt/server"));
            assert_eq!(args.inherit, vec!["host".to_string(), "profile".to_string()]);
            assert!(args.strict);
            assert!(args.dry_run);
            assert_eq!(args.format, "text");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
