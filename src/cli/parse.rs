//! CLI parse: clap types for specgen. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Specgen CLI - feature spec generation from server model descriptions
#[derive(Parser, Debug)]
#[command(name = "specgen", version)]
#[command(about = "Generate deduplicated feature specs from a server's management model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory searched for specgen.toml
    #[arg(long, default_value = ".", global = true)]
    pub project: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate feature specs for a server installation
    Generate(GenerateArgs),
    /// Print the effective configuration as TOML
    Config,
    /// Print the branch id of a spec name
    Branch {
        /// Dot-delimited spec name
        name: String,
        /// Number of dots kept before truncation
        #[arg(long, default_value_t = 1)]
        dots: usize,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Server installation directory
    #[arg(long)]
    pub installation: PathBuf,

    /// Output directory for generated specs
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Spec name supplied by a base feature pack (repeatable)
    #[arg(long = "inherit")]
    pub inherit: Vec<String>,

    /// Base feature pack directory to scan for inherited specs (repeatable)
    #[arg(long = "feature-pack")]
    pub feature_packs: Vec<PathBuf>,

    /// Read the model in an isolated process
    #[arg(long)]
    pub fork: bool,

    /// Report every expansion decision
    #[arg(long)]
    pub debug: bool,

    /// Fail on registration conflicts
    #[arg(long)]
    pub strict: bool,

    /// Generate without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,
}
