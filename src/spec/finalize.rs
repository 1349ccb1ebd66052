//! Finalized spec artifacts

use crate::model::ModelKind;
use crate::registry::SpecRegistry;
use crate::spec::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A capability requirement with the spec resolved to provide it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecRequirement {
    pub capability: String,
    pub optional: bool,
    /// Name of the providing spec, if any spec registered the capability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl SpecRequirement {
    /// A mandatory requirement no spec provides.
    pub fn is_unresolved(&self) -> bool {
        !self.optional && self.provider.is_none()
    }
}

/// The artifact persisted for one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    /// Models the spec applies to
    pub models: Vec<ModelKind>,
    /// Parent specs currently referencing this one
    pub refs: Vec<String>,
    pub params: Vec<String>,
    pub provides: Vec<String>,
    pub requires: Vec<SpecRequirement>,
    pub children: Vec<String>,
    /// Hex-encoded structural fingerprint
    pub fingerprint: String,
}

impl FeatureSpec {
    /// Snapshot `node` together with its referencers and resolved providers.
    pub fn finalize(registry: &SpecRegistry, node: NodeId) -> Self {
        let spec = registry.node(node);
        let requires = spec
            .required_capabilities()
            .iter()
            .map(|(capability, optional)| SpecRequirement {
                capability: capability.clone(),
                optional: *optional,
                provider: registry
                    .get_cap_provider(capability)
                    .map(|provider| registry.node(provider).name.clone()),
            })
            .collect();

        Self {
            name: spec.name.clone(),
            models: spec.models().collect(),
            refs: registry
                .get_referencing_specs(&spec.name)
                .keys()
                .cloned()
                .collect(),
            params: spec.params().into_iter().map(str::to_string).collect(),
            provides: spec.provided_capabilities().iter().cloned().collect(),
            requires,
            // Aliased children are listed under the name of the spec they share
            children: spec
                .children()
                .values()
                .map(|child| registry.node(*child).name.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            fingerprint: hex::encode(spec.fingerprint),
        }
    }

    /// Mandatory requirements without a provider
    pub fn unresolved(&self) -> impl Iterator<Item = &SpecRequirement> {
        self.requires.iter().filter(|req| req.is_unresolved())
    }
}
