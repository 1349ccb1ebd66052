//! Specgen: Feature Spec Generation
//!
//! Converts the introspected management model of an application server
//! distribution into a minimal, deduplicated set of feature specs for a
//! provisioning tool.

pub mod ambient;
pub mod branch;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod inherited;
pub mod logging;
pub mod model;
pub mod registry;
pub mod spec;
pub mod writer;

pub use error::{GenerationError, ModelError, StorageError};
pub use generator::{FeatureSpecGenerator, GenerationReport, GeneratorOptions};
