//! Feature Specs
//!
//! Candidate specs bound to subtrees of the model descriptions, their
//! expansion into the registry, and the finalized artifact handed to a
//! writer.

pub mod expand;
pub mod finalize;
pub mod node;

pub use expand::{ExpansionSettings, Expander, DOMAIN_SPEC, HOST_SPEC, PROFILE_SPEC};
pub use finalize::{FeatureSpec, SpecRequirement};
pub use node::{FeatureSpecNode, NodeId};
