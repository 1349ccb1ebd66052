//! Expansion of model descriptions into spec nodes
//!
//! The root node is expanded once per model kind. Each pass walks the
//! description for its kind depth-first and, for every child, either merges
//! into the spec already registered under the child's name, shares a
//! structurally identical spec from the same branch, or registers a new one.
//! A name sharing another spec is an alias. When a later model gives the
//! alias different content it is split off into a spec of its own.
//!
//! Naming:
//! - standalone children of the root are named by their key, deeper children
//!   `<parent>.<key>`
//! - the profile fragment becomes the `profile` spec; its children take the
//!   standalone names, so a profile resource merges into its standalone spec
//! - domain-level children are named `domain.<key>`
//! - the host fragment becomes the `host` spec with children `host.<key>`

use crate::branch::branch_id;
use crate::error::GenerationError;
use crate::model::{Fingerprint, ModelKind, RawModelDescription};
use crate::registry::{RegistrationConflict, SpecRegistry};
use crate::spec::{FeatureSpecNode, NodeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};

pub const PROFILE_SPEC: &str = "profile";
pub const DOMAIN_SPEC: &str = "domain";
pub const HOST_SPEC: &str = "host";

/// Knobs controlling how descriptions are turned into specs
#[derive(Debug, Clone)]
pub struct ExpansionSettings {
    /// Depth passed to [`branch_id`] to scope sharing
    pub branch_depth: usize,
    /// Fail on registration conflicts instead of overwriting
    pub strict: bool,
    /// Report every expansion decision at info level
    pub debug: bool,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self {
            branch_depth: 1,
            strict: false,
            debug: false,
        }
    }
}

enum Resolution {
    Created(NodeId),
    Merged(NodeId),
    Shared(NodeId),
}

/// Drives the expansion passes of one run against a registry.
pub struct Expander<'r> {
    registry: &'r mut SpecRegistry,
    settings: ExpansionSettings,
    /// (kind, branch id, fingerprint) to the first spec registered with them
    shared: HashMap<ShareKey, NodeId>,
    /// Names registered as aliases of a shared spec, with the kinds bound
    /// through the alias so far
    aliases: HashMap<String, Vec<ModelKind>>,
}

type ShareKey = (ModelKind, String, Fingerprint);

impl<'r> Expander<'r> {
    pub fn new(registry: &'r mut SpecRegistry, settings: ExpansionSettings) -> Self {
        Self {
            registry,
            settings,
            shared: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Expand `root`'s description for `kind`. Does nothing if the root has
    /// no description for that kind.
    pub fn process_children(&mut self, root: NodeId, kind: ModelKind) -> Result<(), GenerationError> {
        let descr = match self.registry.node(root).description(kind) {
            Some(descr) => Arc::clone(descr),
            None => {
                debug!(model = %kind, "No description for model, skipping pass");
                return Ok(());
            }
        };
        debug!(model = %kind, children = descr.children.len(), "Expanding model");

        match kind {
            ModelKind::Standalone => self.expand_children(root, None, &descr, kind),
            ModelKind::Profile => {
                let profile = self.resolve_section(root, PROFILE_SPEC, kind, &descr)?;
                self.expand_children(profile, None, &descr, kind)
            }
            ModelKind::Domain => {
                let parent = if self.registry.node(root).generate_domain {
                    self.resolve_section(root, DOMAIN_SPEC, kind, &descr)?
                } else {
                    root
                };
                self.expand_children(parent, Some(DOMAIN_SPEC), &descr, kind)
            }
            ModelKind::Host => {
                let host = self.resolve_section(root, HOST_SPEC, kind, &descr)?;
                self.expand_children(host, Some(HOST_SPEC), &descr, kind)
            }
        }
    }

    fn expand_children(
        &mut self,
        parent: NodeId,
        prefix: Option<&str>,
        descr: &RawModelDescription,
        kind: ModelKind,
    ) -> Result<(), GenerationError> {
        for (key, child) in &descr.children {
            let name = match prefix {
                Some(prefix) => format!("{}.{}", prefix, key),
                None => key.clone(),
            };
            match self.resolve_child(parent, &name, kind, child, true)? {
                // Already expanded where it was first registered
                Resolution::Shared(_) => {}
                Resolution::Created(id) | Resolution::Merged(id) => {
                    let child_name = self.registry.node(id).name.clone();
                    self.expand_children(id, Some(&child_name), child, kind)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_section(
        &mut self,
        root: NodeId,
        name: &str,
        kind: ModelKind,
        descr: &Arc<RawModelDescription>,
    ) -> Result<NodeId, GenerationError> {
        Ok(match self.resolve_child(root, name, kind, descr, false)? {
            Resolution::Created(id) | Resolution::Merged(id) | Resolution::Shared(id) => id,
        })
    }

    fn resolve_child(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: ModelKind,
        descr: &Arc<RawModelDescription>,
        share: bool,
    ) -> Result<Resolution, GenerationError> {
        let fingerprint = descr.fingerprint();
        let share_key: Option<ShareKey> = (share && !descr.is_trivial()).then(|| {
            (
                kind,
                branch_id(name, self.settings.branch_depth).to_string(),
                fingerprint,
            )
        });
        let shared_hit = share_key
            .as_ref()
            .and_then(|key| self.shared.get(key).copied());
        let mut replaced = None;

        if let Some(found) = self.registry.get_spec(name) {
            let bound = self
                .registry
                .node(found)
                .description(kind)
                .map(|previous| previous.fingerprint() == fingerprint);
            let is_alias = self.registry.node(found).name != name;
            let existing = if is_alias && bound != Some(true) {
                self.split_alias(name, found)?.unwrap_or(found)
            } else {
                found
            };

            let same_content = match self.registry.node(existing).description(kind) {
                None => {
                    self.registry
                        .node_mut(existing)
                        .set_description(kind, Arc::clone(descr));
                    self.register_capabilities(existing, descr)?;
                    self.attach(parent, name, existing);
                    self.decision("merged", name, kind);
                    return Ok(Resolution::Merged(existing));
                }
                Some(previous) => previous.fingerprint() == fingerprint,
            };
            if same_content {
                if self.registry.node(existing).name != name {
                    self.aliases.entry(name.to_string()).or_default().push(kind);
                }
                self.attach(parent, name, existing);
                self.decision("reused", name, kind);
                return Ok(Resolution::Shared(existing));
            }
            // Different content under a known name: register a new spec below,
            // which replaces the old registration.
            replaced = Some(existing);
        } else if let Some(existing) = shared_hit {
            let conflict = self.registry.add_spec(name, existing);
            self.check(conflict)?;
            self.aliases.entry(name.to_string()).or_default().push(kind);
            self.attach(parent, name, existing);
            self.decision("shared", name, kind);
            return Ok(Resolution::Shared(existing));
        }

        let id = self
            .registry
            .insert_node(FeatureSpecNode::new(kind, name, Arc::clone(descr)));
        let conflict = self.registry.add_spec(name, id);
        self.check(conflict)?;
        if let Some(previous) = replaced {
            self.drop_stale_referencers(name, previous);
        }
        self.register_capabilities(id, descr)?;
        if let Some(key) = share_key {
            self.shared.entry(key).or_insert(id);
        }
        self.attach(parent, name, id);
        self.decision("created", name, kind);
        Ok(Resolution::Created(id))
    }

    /// Give the alias `name` its own node once its content diverges from the
    /// shared spec. The new node is bound to the descriptions the alias
    /// shared so far, their children are expanded under `name`, and parents
    /// that linked the alias are relinked to it.
    fn split_alias(
        &mut self,
        name: &str,
        shared: NodeId,
    ) -> Result<Option<NodeId>, GenerationError> {
        let kinds = self.aliases.remove(name).unwrap_or_default();
        let bound: Vec<(ModelKind, Arc<RawModelDescription>)> = kinds
            .iter()
            .filter_map(|&k| {
                self.registry
                    .node(shared)
                    .description(k)
                    .map(|descr| (k, Arc::clone(descr)))
            })
            .collect();
        let Some((first_kind, first)) = bound.first().cloned() else {
            return Ok(None);
        };

        let id = self
            .registry
            .insert_node(FeatureSpecNode::new(first_kind, name, first));
        for (k, descr) in bound.iter().skip(1) {
            self.registry.node_mut(id).set_description(*k, Arc::clone(descr));
        }
        self.registry.rebind_spec(name, id);

        let shared_name = self.registry.node(shared).name.clone();
        let parents = self.registry.get_referencing_specs(name);
        for (parent_name, &parent) in parents.iter() {
            self.registry.node_mut(parent).add_child(name, id);
            let still_linked = self
                .registry
                .node(parent)
                .children()
                .values()
                .any(|&child| child == shared);
            if !still_linked {
                self.registry
                    .remove_referenced_spec(&shared_name, parent_name);
            }
        }
        debug!(spec = name, shared = %shared_name, "Split alias from shared spec");

        for (k, descr) in &bound {
            self.expand_children(id, Some(name), descr, *k)?;
        }
        Ok(Some(id))
    }

    /// Forget parents that still link the node `name` used to resolve to.
    fn drop_stale_referencers(&mut self, name: &str, previous: NodeId) {
        let parents = self.registry.get_referencing_specs(name);
        for (parent_name, &parent) in parents.iter() {
            if self.registry.node(parent).children().get(name) == Some(&previous) {
                self.registry.remove_referenced_spec(name, parent_name);
            }
        }
    }

    fn register_capabilities(
        &mut self,
        node: NodeId,
        descr: &RawModelDescription,
    ) -> Result<(), GenerationError> {
        for cap in &descr.capabilities {
            let conflict = self.registry.add_cap_provider(&cap.name, node);
            self.check(conflict)?;
        }
        Ok(())
    }

    /// Link `child` under `parent` as `name`, which differs from the child's
    /// own name when `name` is an alias.
    fn attach(&mut self, parent: NodeId, name: &str, child: NodeId) {
        let child_name = self.registry.node(child).name.clone();
        let parent_name = self.registry.node(parent).name.clone();
        self.registry.node_mut(parent).add_child(name, child);
        self.registry
            .add_referenced_spec(&child_name, &parent_name, parent);
        if name != child_name {
            self.registry.add_referenced_spec(name, &parent_name, parent);
        }
    }

    fn check(&self, conflict: Option<RegistrationConflict>) -> Result<(), GenerationError> {
        match conflict {
            Some(conflict) if self.settings.strict => Err(GenerationError::Conflict(conflict)),
            _ => Ok(()),
        }
    }

    fn decision(&self, action: &str, name: &str, kind: ModelKind) {
        if self.settings.debug {
            info!(spec = name, model = %kind, "Spec {}", action);
        } else {
            trace!(spec = name, model = %kind, "Spec {}", action);
        }
    }
}
