//! Namespace tree: the data the driver walks to decide what file goes where
//! (spec §4.C "Namespace resolver").

use std::collections::BTreeMap;

use crate::dsdl::{Composite, CompositeRef, Service, Version};
use crate::lang::Language;

/// A composite plus everything the resolver computed about it: nothing here
/// is re-derivable without re-walking the whole namespace, so it's cached
/// once at resolve time rather than recomputed per template render.
#[derive(Debug, Clone)]
pub struct ResolvedComposite {
    pub composite: Composite,
    /// Path relative to the language's output root, e.g.
    /// `uavcan/primitive/Empty_1_0.h`.
    pub output_path: String,
    /// The language-mangled type name a referencing file would spell, e.g.
    /// `uavcan_primitive_Empty_1_0`.
    pub full_reference: String,
}

/// A request/response pair expanded from a `.srv`-shaped definition (spec
/// §3 glossary: "Service"). Each half resolves exactly like a standalone
/// composite; this wrapper just keeps the pairing visible to the driver.
#[derive(Debug, Clone)]
pub struct ResolvedService {
    pub full_name: String,
    pub version: Version,
    pub fixed_port_id: Option<u32>,
    pub request: ResolvedComposite,
    pub response: ResolvedComposite,
}

/// One level of the namespace tree: a dotted path segment, the composites
/// declared directly in it, and its child namespaces.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    pub name: String,
    pub composites: Vec<(String, Version)>,
    pub children: BTreeMap<String, Namespace>,
}

impl Namespace {
    fn child_mut(&mut self, segment: &str) -> &mut Namespace {
        self.children.entry(segment.to_string()).or_insert_with(|| Namespace { name: segment.to_string(), ..Default::default() })
    }
}

/// The full result of resolving a set of composites and services against a
/// target language: an index for bit-length-set and output-path lookups,
/// plus the namespace tree the driver's planning stage walks.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTree {
    pub root: Namespace,
    by_ref: BTreeMap<(String, Version), ResolvedComposite>,
    pub services: Vec<ResolvedService>,
}

impl ResolvedTree {
    pub fn lookup(&self, full_name: &str, version: Version) -> Option<&ResolvedComposite> {
        self.by_ref.get(&(full_name.to_string(), version))
    }

    /// All resolved composites, in a deterministic order (sorted by full
    /// name then version) so the planning and render stages are
    /// reproducible between runs (spec §8 P2 "idempotent generation").
    pub fn all_composites(&self) -> Vec<&ResolvedComposite> {
        self.by_ref.values().collect()
    }

    fn insert(&mut self, resolved: ResolvedComposite) {
        let full_name = resolved.composite.full_name.clone();
        let version = resolved.composite.version;
        let mut node = &mut self.root;
        for segment in resolved.composite.namespace_components() {
            node = node.child_mut(segment);
        }
        node.composites.push((full_name.clone(), version));
        self.by_ref.insert((full_name, version), resolved);
    }
}

impl crate::dsdl::CompositeLookup for ResolvedTree {
    fn lookup(&self, reference: &CompositeRef) -> Option<&Composite> {
        self.by_ref.get(&(reference.full_name.clone(), reference.version)).map(|r| &r.composite)
    }
}

pub(super) fn build_resolved(composite: Composite, language: &dyn Language) -> ResolvedComposite {
    let output_path = language.relative_header_path(&composite.full_name, composite.version);
    let full_reference = language.full_reference(&composite.full_name, composite.version);
    ResolvedComposite { composite, output_path, full_reference }
}

pub(super) fn build_resolved_service(service: Service, language: &dyn Language) -> ResolvedService {
    ResolvedService {
        full_name: service.full_name,
        version: service.version,
        fixed_port_id: service.fixed_port_id,
        request: build_resolved(service.request, language),
        response: build_resolved(service.response, language),
    }
}

pub(super) fn insert_into(tree: &mut ResolvedTree, resolved: ResolvedComposite) {
    tree.insert(resolved);
}
