//! Spec nodes

use crate::model::{Fingerprint, ModelKind, RawModelDescription};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Handle of a node owned by the [`SpecRegistry`](crate::registry::SpecRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// One candidate spec.
///
/// A node may be the child of several parents when it is shared, so children
/// are stored as handles and the registry owns the nodes themselves. A node
/// collects one description per model kind it was found in.
#[derive(Debug, Clone)]
pub struct FeatureSpecNode {
    /// Kind the node was first discovered in
    pub kind: ModelKind,
    pub name: String,
    /// Fingerprint of the description the node was created from
    pub fingerprint: Fingerprint,
    /// Whether the domain pass produces a separate `domain` spec under this node
    pub generate_domain: bool,
    descriptions: BTreeMap<ModelKind, Arc<RawModelDescription>>,
    children: BTreeMap<String, NodeId>,
    provided: BTreeSet<String>,
    /// Required capability name to whether it is optional
    required: BTreeMap<String, bool>,
}

impl FeatureSpecNode {
    pub fn new(kind: ModelKind, name: impl Into<String>, description: Arc<RawModelDescription>) -> Self {
        let mut node = Self {
            kind,
            name: name.into(),
            fingerprint: description.fingerprint(),
            generate_domain: true,
            descriptions: BTreeMap::new(),
            children: BTreeMap::new(),
            provided: BTreeSet::new(),
            required: BTreeMap::new(),
        };
        node.set_description(kind, description);
        node
    }

    pub fn description(&self, kind: ModelKind) -> Option<&Arc<RawModelDescription>> {
        self.descriptions.get(&kind)
    }

    /// Bind `description` for `kind` and absorb its capability declarations.
    /// Returns the description it replaced, if any.
    pub fn set_description(
        &mut self,
        kind: ModelKind,
        description: Arc<RawModelDescription>,
    ) -> Option<Arc<RawModelDescription>> {
        for cap in &description.capabilities {
            self.provided.insert(cap.name.clone());
        }
        for req in &description.requires {
            // A mandatory requirement from any model wins over an optional one
            let optional = self.required.entry(req.name.clone()).or_insert(req.optional);
            *optional &= req.optional;
        }
        self.descriptions.insert(kind, description)
    }

    /// Model kinds this node has a description for, in expansion order.
    pub fn models(&self) -> impl Iterator<Item = ModelKind> + '_ {
        self.descriptions.keys().copied()
    }

    pub fn children(&self) -> &BTreeMap<String, NodeId> {
        &self.children
    }

    /// Link a child spec. Returns false if it was already linked.
    pub fn add_child(&mut self, name: &str, child: NodeId) -> bool {
        self.children.insert(name.to_string(), child) != Some(child)
    }

    pub fn provided_capabilities(&self) -> &BTreeSet<String> {
        &self.provided
    }

    pub fn required_capabilities(&self) -> &BTreeMap<String, bool> {
        &self.required
    }

    /// Union of attribute names across all bound descriptions.
    pub fn params(&self) -> BTreeSet<&str> {
        self.descriptions
            .values()
            .flat_map(|descr| descr.attributes.keys().map(String::as_str))
            .collect()
    }
}
