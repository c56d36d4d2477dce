//! Dependency analyzer (spec §4.D): a pure query over a resolved namespace
//! that never touches the filesystem itself. The generation driver calls
//! this to decide what to render and what to report, and `--dry-run`
//! consults the exact same [`DependencyAnalyzer`] instead of a separate
//! code path, which is what makes dry-run and wet-run agree (spec §8 P3).

use std::path::{Path, PathBuf};

use nunavut::resolve::ResolvedTree;
use nunavut::LanguageId;
use support::GenerateSupportPolicy;

use crate::manifest::Manifest;

pub struct DependencyAnalyzer<'a> {
    tree: &'a ResolvedTree,
    language_id: LanguageId,
    roots: &'a [PathBuf],
    support_policy: GenerateSupportPolicy,
}

impl<'a> DependencyAnalyzer<'a> {
    pub fn new(tree: &'a ResolvedTree, language_id: LanguageId, roots: &'a [PathBuf], support_policy: GenerateSupportPolicy) -> Self {
        DependencyAnalyzer { tree, language_id, roots, support_policy }
    }

    /// Every source this run's outputs depend on: the root namespace
    /// directories plus the embedded support-library source, which is a
    /// real input even though it never lives on disk in this repository
    /// (spec §4.D: "inputs includes the support library's own source").
    pub fn inputs(&self) -> Vec<PathBuf> {
        let mut inputs: Vec<PathBuf> = self.roots.to_vec();
        inputs.push(PathBuf::from(format!("<embedded support library: {}>", self.language_id.name())));
        inputs.sort();
        inputs
    }

    fn emits_support(&self) -> bool {
        match self.support_policy {
            GenerateSupportPolicy::Never => false,
            GenerateSupportPolicy::Only => true,
            GenerateSupportPolicy::AsNeeded => !self.tree.all_composites().is_empty() || !self.tree.services.is_empty(),
        }
    }

    fn composite_outputs(&self) -> Vec<PathBuf> {
        if self.support_policy == GenerateSupportPolicy::Only {
            return Vec::new();
        }
        let mut outputs: Vec<PathBuf> = self.tree.all_composites().iter().map(|r| PathBuf::from(&r.output_path)).collect();
        for service in &self.tree.services {
            outputs.push(PathBuf::from(&service.request.output_path));
            outputs.push(PathBuf::from(&service.response.output_path));
        }
        outputs.sort();
        outputs
    }

    /// Every file this run will write (or would, under `--dry-run`),
    /// relative to the output root, sorted lexicographically (spec §6
    /// "Manifest format": "arrays of paths are sorted lexicographically").
    pub fn outputs(&self) -> Vec<PathBuf> {
        let mut outputs = self.composite_outputs();
        if self.emits_support() {
            outputs.push(PathBuf::from(support::support_relative_path(self.language_id)));
        }
        outputs.sort();
        outputs
    }

    pub fn manifest(&self, output_root: &Path) -> Manifest {
        Manifest { inputs: self.inputs(), outputs: self.outputs().into_iter().map(|p| output_root.join(p)).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nunavut::dsdl::builder::*;
    use nunavut::lang::{for_id, LanguageId as Lang};
    use nunavut::resolve::resolve;

    #[test]
    fn never_policy_omits_support_library_output() {
        let lang = for_id(Lang::C);
        let composite = sealed_structure("a.Foo", version(1, 0), vec![field("x", uint(8))], 1);
        let tree = resolve(vec![composite], vec![], lang.as_ref()).unwrap();
        let roots = vec![PathBuf::from("dsdl")];
        let analyzer = DependencyAnalyzer::new(&tree, Lang::C, &roots, GenerateSupportPolicy::Never);
        assert!(!analyzer.outputs().iter().any(|p| p.to_string_lossy().contains("serialization")));
    }

    #[test]
    fn as_needed_policy_includes_support_library_when_types_exist() {
        let lang = for_id(Lang::C);
        let composite = sealed_structure("a.Foo", version(1, 0), vec![field("x", uint(8))], 1);
        let tree = resolve(vec![composite], vec![], lang.as_ref()).unwrap();
        let roots = vec![PathBuf::from("dsdl")];
        let analyzer = DependencyAnalyzer::new(&tree, Lang::C, &roots, GenerateSupportPolicy::AsNeeded);
        assert!(analyzer.outputs().iter().any(|p| p.to_string_lossy().contains("serialization")));
    }

    #[test]
    fn only_policy_emits_nothing_but_the_support_library() {
        let lang = for_id(Lang::C);
        let composite = sealed_structure("a.Foo", version(1, 0), vec![field("x", uint(8))], 1);
        let tree = resolve(vec![composite], vec![], lang.as_ref()).unwrap();
        let roots = vec![PathBuf::from("dsdl")];
        let analyzer = DependencyAnalyzer::new(&tree, Lang::C, &roots, GenerateSupportPolicy::Only);
        assert_eq!(analyzer.outputs().len(), 1);
    }

    #[test]
    fn inputs_always_names_the_embedded_support_source() {
        let lang = for_id(Lang::C);
        let tree = resolve(vec![], vec![], lang.as_ref()).unwrap();
        let roots = vec![PathBuf::from("dsdl")];
        let analyzer = DependencyAnalyzer::new(&tree, Lang::C, &roots, GenerateSupportPolicy::Never);
        assert!(analyzer.inputs().iter().any(|p| p.to_string_lossy().contains("embedded support library")));
    }
}
