//! Feature Spec Generation Driver
//!
//! One synchronous run: read the standalone and domain models, bind the
//! domain fragments to the root spec, expand the root once per model kind in
//! fixed order, then finalize and write every reachable spec that is not
//! inherited. The whole run is wrapped in an [`AmbientScope`].

use crate::ambient::AmbientScope;
use crate::error::GenerationError;
use crate::model::{ModelKind, ModelReader, RawModelDescription, ReadOptions};
use crate::registry::{RegistrationConflict, SpecRegistry};
use crate::spec::{Expander, ExpansionSettings, FeatureSpec, FeatureSpecNode, NodeId};
use crate::writer::SpecWriter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Domain child holding the host model
pub const HOST_CHILD: &str = "host";
/// Domain child holding the profile model
pub const PROFILE_CHILD: &str = "profile";

/// Settings for a generation run
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub output_dir: PathBuf,
    pub inherited: HashSet<String>,
    /// Ask the reader to load the model in an isolated process
    pub fork: bool,
    pub debug: bool,
    pub strict: bool,
    pub branch_depth: usize,
    /// Parameters handed to the model reader
    pub properties: BTreeMap<String, String>,
}

impl GeneratorOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            inherited: HashSet::new(),
            fork: false,
            debug: false,
            strict: false,
            branch_depth: ExpansionSettings::default().branch_depth,
            properties: BTreeMap::new(),
        }
    }
}

/// A mandatory capability no spec provides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRequirement {
    pub spec: String,
    pub capability: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub specs_generated: usize,
    pub inherited_skipped: Vec<String>,
    pub conflicts: Vec<RegistrationConflict>,
    pub unresolved: Vec<UnresolvedRequirement>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
}

/// Turns the model descriptions of an installation into feature specs.
pub struct FeatureSpecGenerator<'a> {
    options: GeneratorOptions,
    reader: &'a dyn ModelReader,
    writer: &'a mut dyn SpecWriter,
}

impl<'a> FeatureSpecGenerator<'a> {
    pub fn new(
        options: GeneratorOptions,
        reader: &'a dyn ModelReader,
        writer: &'a mut dyn SpecWriter,
    ) -> Self {
        Self {
            options,
            reader,
            writer,
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Run the generation and return the number of specs written.
    pub fn generate_specs(&mut self, installation: &Path) -> Result<usize, GenerationError> {
        self.run(installation).map(|report| report.specs_generated)
    }

    /// Run the generation and return the full report.
    ///
    /// The process environment is restored before this returns, on success
    /// and on failure.
    #[instrument(skip(self, installation), fields(installation = %installation.display()))]
    pub fn run(&mut self, installation: &Path) -> Result<GenerationReport, GenerationError> {
        let _ambient = AmbientScope::capture();
        let started_at = Utc::now();
        let start = Instant::now();
        info!(output = %self.options.output_dir.display(), "Starting spec generation");

        let result = self.do_generate(installation);
        match &result {
            Ok(partial) => info!(
                specs = partial.specs_generated,
                conflicts = partial.conflicts.len(),
                duration_ms = start.elapsed().as_millis(),
                "Spec generation completed"
            ),
            Err(e) => warn!(error = %e, "Spec generation failed"),
        }

        result.map(|partial| GenerationReport {
            specs_generated: partial.specs_generated,
            inherited_skipped: partial.inherited_skipped,
            conflicts: partial.conflicts,
            unresolved: partial.unresolved,
            started_at,
            duration_ms: start.elapsed().as_millis(),
        })
    }

    fn do_generate(&mut self, installation: &Path) -> Result<BuildSummary, GenerationError> {
        let read_options = ReadOptions {
            fork: self.options.fork,
            properties: self.options.properties.clone(),
        };

        let standalone = self.reader.read_standalone(installation, &read_options)?;
        let root_name = standalone.require_name("standalone model")?.to_string();
        let mut registry = SpecRegistry::new(self.options.inherited.clone());
        let root = registry.insert_node(FeatureSpecNode::new(
            ModelKind::Standalone,
            root_name.clone(),
            Arc::new(standalone),
        ));
        registry.add_spec(&root_name, root);

        let domain = self.reader.read_domain(installation, &read_options)?;
        bind_domain(registry.node_mut(root), &domain);

        let mut expander = Expander::new(
            &mut registry,
            ExpansionSettings {
                branch_depth: self.options.branch_depth,
                strict: self.options.strict,
                debug: self.options.debug,
            },
        );
        for kind in ModelKind::EXPANSION_ORDER {
            expander.process_children(root, kind)?;
        }
        debug!(nodes = registry.node_count(), "Expansion finished");

        self.build_specs(&mut registry, root)
    }

    /// Write every reachable non-inherited node once, parents before children.
    fn build_specs(
        &mut self,
        registry: &mut SpecRegistry,
        root: NodeId,
    ) -> Result<BuildSummary, GenerationError> {
        let mut summary = BuildSummary::default();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = registry.node(id);
            stack.extend(node.children().values().rev().copied());
            let name = node.name.clone();

            // A replaced registration can leave its old node linked from a parent
            if registry.get_spec(&name) != Some(id) {
                let conflict = RegistrationConflict::Shadowed { name };
                if self.options.strict {
                    return Err(GenerationError::Conflict(conflict));
                }
                registry.record_conflict(conflict);
                continue;
            }

            if registry.is_inherited(&name) {
                debug!(spec = %name, "Skipping inherited spec");
                summary.inherited_skipped.push(name);
                continue;
            }

            let spec = FeatureSpec::finalize(registry, id);
            for requirement in spec.unresolved() {
                warn!(spec = %name, capability = %requirement.capability, "No provider for required capability");
                summary.unresolved.push(UnresolvedRequirement {
                    spec: name.clone(),
                    capability: requirement.capability.clone(),
                });
            }
            self.writer.write(&spec, &self.options.output_dir)?;
            registry.increase_spec_count();
            registry.clear_referencing_specs(&name);
        }

        summary.specs_generated = registry.specs_generated();
        summary.conflicts = registry.conflicts().to_vec();
        Ok(summary)
    }
}

#[derive(Debug, Default)]
struct BuildSummary {
    specs_generated: usize,
    inherited_skipped: Vec<String>,
    conflicts: Vec<RegistrationConflict>,
    unresolved: Vec<UnresolvedRequirement>,
}

/// Split the domain model across the root: `host` and `profile` become the
/// root's host and profile descriptions, every other child is folded into the
/// root's own domain description. The root then produces no separate domain
/// spec.
fn bind_domain(root: &mut FeatureSpecNode, domain: &RawModelDescription) {
    let mut domain_descr = RawModelDescription::named("domain");
    for (key, child) in &domain.children {
        match key.as_str() {
            HOST_CHILD => {
                root.set_description(ModelKind::Host, Arc::clone(child));
            }
            PROFILE_CHILD => {
                root.set_description(ModelKind::Profile, Arc::clone(child));
            }
            _ => domain_descr.add_child(key.clone(), Arc::clone(child)),
        }
    }
    root.set_description(ModelKind::Domain, Arc::new(domain_descr));
    root.generate_domain = false;
}
