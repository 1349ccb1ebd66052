//! Spec Registry
//!
//! Run-scoped bookkeeping for spec generation. The registry owns every
//! [`FeatureSpecNode`] discovered during a run (parents refer to children by
//! [`NodeId`]), and indexes them by spec name, by the parents that share them,
//! and by the capabilities they provide.
//!
//! Re-registering a name or a capability is last-write-wins. When the
//! replacement is a different spec, the overwrite is returned and recorded as
//! a [`RegistrationConflict`] so the caller can warn or, in strict mode, fail.

use crate::spec::{FeatureSpecNode, NodeId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// Snapshot of the parents referencing a spec, keyed by parent spec name.
///
/// Views are immutable: registering another referencer later copies the
/// underlying map instead of changing a view already handed out.
pub type ReferencingSpecs = Rc<BTreeMap<String, NodeId>>;

/// A registration that replaced a different spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistrationConflict {
    /// A spec name was registered again for a structurally different spec.
    SpecName {
        name: String,
        previous: String,
        replacement: String,
    },
    /// A capability gained a second provider.
    CapabilityProvider {
        capability: String,
        previous: String,
        replacement: String,
    },
    /// A node left behind by a replaced registration was still reachable
    /// and was not written.
    Shadowed { name: String },
}

impl fmt::Display for RegistrationConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationConflict::SpecName {
                name,
                previous,
                replacement,
            } => write!(
                f,
                "spec name '{}' registered for '{}' was replaced by a different '{}'",
                name, previous, replacement
            ),
            RegistrationConflict::CapabilityProvider {
                capability,
                previous,
                replacement,
            } => write!(
                f,
                "capability '{}' provided by '{}' was replaced by '{}'",
                capability, previous, replacement
            ),
            RegistrationConflict::Shadowed { name } => write!(
                f,
                "a replaced spec named '{}' was still linked and was skipped",
                name
            ),
        }
    }
}

/// Name, referencer and capability indexes over the nodes of one run
#[derive(Debug, Default)]
pub struct SpecRegistry {
    nodes: Vec<FeatureSpecNode>,
    specs_by_name: HashMap<String, NodeId>,
    referenced_specs: HashMap<String, ReferencingSpecs>,
    cap_providers: HashMap<String, NodeId>,
    inherited: HashSet<String>,
    specs_generated: usize,
    conflicts: Vec<RegistrationConflict>,
}

impl SpecRegistry {
    /// Create a registry for a run. `inherited` is fixed for the whole run.
    pub fn new(inherited: HashSet<String>) -> Self {
        Self {
            inherited,
            ..Self::default()
        }
    }

    /// Take ownership of a node. It is not reachable by name until
    /// [`add_spec`](Self::add_spec) is called.
    pub fn insert_node(&mut self, node: FeatureSpecNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &FeatureSpecNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut FeatureSpecNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes owned by the registry
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Register `node` under `name`, replacing any previous registration.
    pub fn add_spec(&mut self, name: &str, node: NodeId) -> Option<RegistrationConflict> {
        let previous = self.specs_by_name.insert(name.to_string(), node)?;
        if previous == node || self.node(previous).fingerprint == self.node(node).fingerprint {
            return None;
        }
        let conflict = RegistrationConflict::SpecName {
            name: name.to_string(),
            previous: self.node(previous).name.clone(),
            replacement: self.node(node).name.clone(),
        };
        self.record_conflict(conflict.clone());
        Some(conflict)
    }

    /// Move an alias name off the spec it shared onto a node of its own.
    pub fn rebind_spec(&mut self, name: &str, node: NodeId) {
        self.specs_by_name.insert(name.to_string(), node);
    }

    pub fn get_spec(&self, name: &str) -> Option<NodeId> {
        self.specs_by_name.get(name).copied()
    }

    /// Record that `referencing_node`, registered as `referencing_name`,
    /// currently shares the spec named `referenced_name`.
    pub fn add_referenced_spec(
        &mut self,
        referenced_name: &str,
        referencing_name: &str,
        referencing_node: NodeId,
    ) {
        match self.referenced_specs.get_mut(referenced_name) {
            Some(specs) => {
                Rc::make_mut(specs).insert(referencing_name.to_string(), referencing_node);
            }
            None => {
                let single = BTreeMap::from([(referencing_name.to_string(), referencing_node)]);
                self.referenced_specs
                    .insert(referenced_name.to_string(), Rc::new(single));
            }
        }
    }

    /// All parents currently referencing `referenced_name` (possibly none).
    pub fn get_referencing_specs(&self, referenced_name: &str) -> ReferencingSpecs {
        self.referenced_specs
            .get(referenced_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Stop tracking `referencing_name` as a referencer of `referenced_name`.
    /// Views handed out earlier keep their entries.
    pub fn remove_referenced_spec(&mut self, referenced_name: &str, referencing_name: &str) {
        if let Some(specs) = self.referenced_specs.get_mut(referenced_name) {
            if specs.contains_key(referencing_name) {
                Rc::make_mut(specs).remove(referencing_name);
            }
        }
    }

    pub fn clear_referencing_specs(&mut self, referenced_name: &str) {
        self.referenced_specs.remove(referenced_name);
    }

    /// Make `node` the provider of `capability` for all later lookups.
    pub fn add_cap_provider(
        &mut self,
        capability: &str,
        node: NodeId,
    ) -> Option<RegistrationConflict> {
        let previous = self.cap_providers.insert(capability.to_string(), node)?;
        if previous == node {
            return None;
        }
        let conflict = RegistrationConflict::CapabilityProvider {
            capability: capability.to_string(),
            previous: self.node(previous).name.clone(),
            replacement: self.node(node).name.clone(),
        };
        self.record_conflict(conflict.clone());
        Some(conflict)
    }

    pub fn get_cap_provider(&self, capability: &str) -> Option<NodeId> {
        self.cap_providers.get(capability).copied()
    }

    pub fn is_inherited(&self, name: &str) -> bool {
        self.inherited.contains(name)
    }

    pub fn increase_spec_count(&mut self) {
        self.specs_generated += 1;
    }

    pub fn specs_generated(&self) -> usize {
        self.specs_generated
    }

    /// Overwrites recorded so far, in registration order
    pub fn conflicts(&self) -> &[RegistrationConflict] {
        &self.conflicts
    }

    /// Keep `conflict` for the run report.
    pub fn record_conflict(&mut self, conflict: RegistrationConflict) {
        warn!(%conflict, "Spec registration conflict");
        self.conflicts.push(conflict);
    }
}
