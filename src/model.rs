//! Management Model Descriptions
//!
//! The introspected resource tree of a server distribution, as produced by a
//! [`ModelReader`]. One description is read for the standalone model and one
//! for the domain model; the domain description nests the `profile` and
//! `host` fragments.

pub mod description;
pub mod kind;
pub mod reader;

pub use description::{CapabilityDecl, CapabilityRequirement, Fingerprint, RawModelDescription};
pub use kind::ModelKind;
pub use reader::{reader_from_config, CommandModelReader, JsonModelReader, ModelReader, ReadOptions};
