//! Raw model description tree and its structural fingerprint

use crate::error::ModelError;
use blake3::Hasher;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Structural hash of a description subtree.
pub type Fingerprint = [u8; 32];

/// A capability a resource provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDecl {
    pub name: String,
    /// Dynamic capabilities are qualified by the resource address at runtime.
    #[serde(default)]
    pub dynamic: bool,
}

/// A capability a resource requires from some other resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRequirement {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
}

/// Read-only resource description, captured once per model kind.
///
/// `children` keeps the order the reader produced. Subtrees are reference
/// counted so spec nodes can hold on to the description they were built from
/// without copying it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawModelDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,

    #[serde(default)]
    pub capabilities: Vec<CapabilityDecl>,

    #[serde(default)]
    pub requires: Vec<CapabilityRequirement>,

    #[serde(default, deserialize_with = "deserialize_children")]
    pub children: Vec<(String, Arc<RawModelDescription>)>,
}

/// Children may be written as an ordered list of `[key, description]` pairs
/// or as an object, in which case they are taken in key order.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChildrenRepr {
    Pairs(Vec<(String, Arc<RawModelDescription>)>),
    Keyed(BTreeMap<String, Arc<RawModelDescription>>),
}

fn deserialize_children<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, Arc<RawModelDescription>)>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ChildrenRepr::deserialize(deserializer)? {
        ChildrenRepr::Pairs(pairs) => pairs,
        ChildrenRepr::Keyed(map) => map.into_iter().collect(),
    })
}

impl RawModelDescription {
    /// Empty description carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Parse a JSON-encoded description. `origin` names the source in errors.
    pub fn from_json_slice(bytes: &[u8], origin: &str) -> Result<Self, ModelError> {
        serde_json::from_slice(bytes).map_err(|source| ModelError::Malformed {
            origin: origin.to_string(),
            source,
        })
    }

    /// The description's name, which a model root must carry.
    pub fn require_name(&self, origin: &str) -> Result<&str, ModelError> {
        self.name
            .as_deref()
            .ok_or_else(|| ModelError::MissingName(origin.to_string()))
    }

    /// Look up a direct child by key.
    pub fn child(&self, key: &str) -> Option<&Arc<RawModelDescription>> {
        self.children
            .iter()
            .find(|(child_key, _)| child_key == key)
            .map(|(_, child)| child)
    }

    pub fn add_child(&mut self, key: impl Into<String>, child: Arc<RawModelDescription>) {
        self.children.push((key.into(), child));
    }

    /// True when the description declares nothing at all.
    pub fn is_trivial(&self) -> bool {
        self.attributes.is_empty()
            && self.capabilities.is_empty()
            && self.requires.is_empty()
            && self.children.is_empty()
    }

    /// Compute the structural fingerprint of this subtree.
    ///
    /// The description's own `name` is left out so that identical resources
    /// registered under different names hash the same. Child keys are part of
    /// the structure and are included.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Hasher::new();
        self.hash_into(&mut hasher);
        *hasher.finalize().as_bytes()
    }

    fn hash_into(&self, hasher: &mut Hasher) {
        // Every section and variable-length field is length-prefixed
        hasher.update(b"a");
        hash_len(hasher, self.attributes.len());
        for (name, value) in &self.attributes {
            hash_bytes(hasher, name.as_bytes());
            // serde_json maps are key-ordered, so Display output is canonical
            hash_bytes(hasher, value.to_string().as_bytes());
        }
        hasher.update(b"c");
        hash_len(hasher, self.capabilities.len());
        for cap in &self.capabilities {
            hash_bytes(hasher, cap.name.as_bytes());
            hasher.update(&[cap.dynamic as u8]);
        }
        hasher.update(b"r");
        hash_len(hasher, self.requires.len());
        for req in &self.requires {
            hash_bytes(hasher, req.name.as_bytes());
            hasher.update(&[req.optional as u8]);
        }
        hasher.update(b"n");
        hash_len(hasher, self.children.len());
        for (key, child) in &self.children {
            hash_bytes(hasher, key.as_bytes());
            child.hash_into(hasher);
        }
    }
}

fn hash_len(hasher: &mut Hasher, len: usize) {
    hasher.update(&(len as u64).to_be_bytes());
}

fn hash_bytes(hasher: &mut Hasher, bytes: &[u8]) {
    hash_len(hasher, bytes.len());
    hasher.update(bytes);
}
