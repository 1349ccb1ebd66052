//! Merge rules: defaults applied beneath every other source.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("output_dir", "feature-specs")?
        .set_default("branch_depth", 1)?
        .set_default("reader.kind", "json")?
        .set_default("reader.standalone_file", "standalone-model.json")?
        .set_default("reader.domain_file", "domain-model.json")
}
