//! Namespace resolver (spec §4.C): turns the front end's flat list of
//! composites and services into a [`tree::ResolvedTree`], checking for the
//! two structural errors the rest of the pipeline can't recover from.
//!
//! Cycle detection in the DSDL type graph is **not** this resolver's job:
//! spec §9 states the graph is already acyclic by the time it reaches here,
//! so this module only orders composites for deterministic emission and
//! flags the two failures that a front end collaborator cannot itself
//! guarantee the absence of (duplicate definitions, and references that
//! escaped the set it was given).

pub mod tree;

pub use tree::{Namespace, ResolvedComposite, ResolvedService, ResolvedTree};

use std::collections::{BTreeMap, BTreeSet};

use diagnostics::Diagnostic;

use crate::dsdl::{Composite, Service};
use crate::lang::Language;

/// Resolves `composites` and `services` against `language`.
///
/// Returns every [`Diagnostic`] found rather than stopping at the first one
/// (spec §4.C: "the resolver reports every NameCollision and every
/// MissingDependency it finds in a single pass, not just the first").
pub fn resolve(composites: Vec<Composite>, services: Vec<Service>, language: &dyn Language) -> Result<ResolvedTree, Vec<Diagnostic>> {
    let mut errors = Vec::new();
    let mut seen: BTreeSet<(String, u8, u8)> = BTreeSet::new();
    let mut seen_mangled: BTreeMap<String, String> = BTreeMap::new();

    check_collisions(&composites, &services, &mut seen, &mut seen_mangled, language, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut tree = ResolvedTree::default();
    for composite in &composites {
        let resolved = tree::build_resolved(composite.clone(), language);
        tree::insert_into(&mut tree, resolved);
    }
    for service in services {
        let resolved = tree::build_resolved_service(service, language);
        tree.services.push(resolved);
    }

    check_missing_dependencies(&composites, &tree, &mut errors);

    if errors.is_empty() {
        Ok(tree)
    } else {
        Err(errors)
    }
}

fn check_collisions(
    composites: &[Composite],
    services: &[Service],
    seen: &mut BTreeSet<(String, u8, u8)>,
    seen_mangled: &mut BTreeMap<String, String>,
    language: &dyn Language,
    errors: &mut Vec<Diagnostic>,
) {
    let mut check_one = |full_name: &str, major: u8, minor: u8, errors: &mut Vec<Diagnostic>| {
        let key = (full_name.to_string(), major, minor);
        if !seen.insert(key) {
            errors.push(Diagnostic::name_collision(full_name, format!("{full_name}.{major}.{minor}")));
        }
        let mangled = language.full_reference(full_name, crate::dsdl::Version { major, minor });
        if let Some(existing) = seen_mangled.insert(mangled.clone(), full_name.to_string()) {
            if existing != full_name {
                errors.push(Diagnostic::name_collision(
                    language.id().name(),
                    format!("{existing} and {full_name} both mangle to '{mangled}'"),
                ));
            }
        }
    };

    for composite in composites {
        check_one(&composite.full_name, composite.version.major, composite.version.minor, errors);
    }
    for service in services {
        check_one(&service.full_name, service.version.major, service.version.minor, errors);
    }
}

fn check_missing_dependencies(composites: &[Composite], tree: &ResolvedTree, errors: &mut Vec<Diagnostic>) {
    for composite in composites {
        for dependency in composite.direct_dependencies() {
            if tree.lookup(&dependency.full_name, dependency.version).is_none() {
                errors.push(Diagnostic::missing_dependency(
                    format!("{}.{}", dependency.full_name, dependency.version),
                    composite.full_name.clone(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsdl::builder::*;
    use crate::lang::{for_id, LanguageId};

    #[test]
    fn resolves_independent_composites_into_namespace_tree() {
        let lang = for_id(LanguageId::C);
        let a = sealed_structure("uavcan.primitive.Empty", version(1, 0), vec![], 0);
        let b = sealed_structure("uavcan.node.Heartbeat", version(1, 0), vec![field("uptime", uint(32))], 4);
        let tree = resolve(vec![a, b], vec![], lang.as_ref()).expect("resolves cleanly");
        assert_eq!(tree.all_composites().len(), 2);
        let empty = tree.lookup("uavcan.primitive.Empty", version(1, 0)).unwrap();
        assert_eq!(empty.output_path, "uavcan/primitive/Empty_1_0.h");
    }

    #[test]
    fn duplicate_definition_is_a_name_collision() {
        let lang = for_id(LanguageId::C);
        let a = sealed_structure("a.Foo", version(1, 0), vec![], 0);
        let b = sealed_structure("a.Foo", version(1, 0), vec![field("x", uint(8))], 1);
        let err = resolve(vec![a, b], vec![], lang.as_ref()).unwrap_err();
        assert!(matches!(err[0], Diagnostic::NameCollision { .. }));
    }

    #[test]
    fn dangling_reference_is_a_missing_dependency() {
        let lang = for_id(LanguageId::C);
        let a = sealed_structure("a.Foo", version(1, 0), vec![composite_field("inner", "a.Missing", version(1, 0))], 4);
        let err = resolve(vec![a], vec![], lang.as_ref()).unwrap_err();
        assert!(matches!(err[0], Diagnostic::MissingDependency { .. }));
    }
}
