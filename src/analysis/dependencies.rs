//! Cross-module dependency resolution.
//!
//! Declared imports are matched against a lookup of logical module
//! identifiers, most specific candidate first. Resolution is deliberately
//! best-effort and suffix-based: it may under- or over-resolve, and when
//! two distinct modules provide the same most-specific identifier the
//! stored set wins. These are documented heuristic limits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::analysis::csharp::NAMESPACE_TAG;
use crate::config::Language;
use crate::model::ModuleInfo;

/// Directed graph of module dependencies.
///
/// Every successfully parsed module appears as a key, possibly with an
/// empty target set; no entry ever contains its own key.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
}

impl DependencyGraph {
    /// Ensure `path` exists as a key, with no targets yet.
    pub fn insert_module(&mut self, path: PathBuf) {
        self.edges.entry(path).or_default();
    }

    /// Record that `from` depends on `to`. Self-edges are filtered.
    pub fn add_edge(&mut self, from: &Path, to: PathBuf) {
        if from == to.as_path() {
            return;
        }
        self.edges.entry(from.to_path_buf()).or_default().insert(to);
    }

    pub fn dependencies(&self, path: &Path) -> Option<&BTreeSet<PathBuf>> {
        self.edges.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &BTreeSet<PathBuf>)> {
        self.edges.iter()
    }

    pub fn module_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|targets| targets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sorted union of every source and target path in the graph.
    pub fn paths(&self) -> Vec<&PathBuf> {
        let mut all: BTreeSet<&PathBuf> = self.edges.keys().collect();
        for targets in self.edges.values() {
            all.extend(targets.iter());
        }
        all.into_iter().collect()
    }
}

/// Build the dependency graph for the analyzed modules.
pub fn dependency_graph(
    modules: &[ModuleInfo],
    repository: &Path,
    language: Language,
) -> Result<DependencyGraph> {
    let providers = provider_lookup(modules, repository, language)?;
    let mut graph = DependencyGraph::default();

    for module in modules {
        graph.insert_module(module.path.clone());
    }

    for module in modules {
        for import in &module.imports {
            let identifier = import.strip_prefix(NAMESPACE_TAG).unwrap_or(import);

            // Candidates from the complete identifier down to its shortest
            // form; the first one present in the lookup wins.
            let mut parts: Vec<&str> = identifier.split('.').collect();
            let targets = loop {
                if parts.is_empty() {
                    break None;
                }
                let candidate = parts.join(".");
                if let Some(found) = providers.get(&candidate) {
                    break Some(found);
                }
                parts.pop();
            };

            if let Some(targets) = targets {
                for target in targets {
                    graph.add_edge(&module.path, target.clone());
                }
            }
        }
    }

    Ok(graph)
}

/// Map each logical module identifier to the set of module paths providing
/// it.
///
/// For the brace-delimited language identifiers come from tagged namespace
/// imports; for the indentation-delimited language each module's own
/// repository-relative dotted path is its identifier.
fn provider_lookup(
    modules: &[ModuleInfo],
    repository: &Path,
    language: Language,
) -> Result<HashMap<String, BTreeSet<PathBuf>>> {
    let mut providers: HashMap<String, BTreeSet<PathBuf>> = HashMap::new();

    for module in modules {
        match language {
            Language::CSharp => {
                for import in &module.imports {
                    if let Some(namespace) = import.strip_prefix(NAMESPACE_TAG) {
                        providers
                            .entry(namespace.to_string())
                            .or_default()
                            .insert(module.path.clone());
                    }
                }
            }
            Language::Python => {
                let relative = module.path.strip_prefix(repository).with_context(|| {
                    format!(
                        "module {} is not under repository root {}",
                        module.path.display(),
                        repository.display()
                    )
                })?;
                let identifier = dotted_identifier(relative);
                providers
                    .entry(identifier)
                    .or_default()
                    .insert(module.path.clone());
            }
        }
    }

    Ok(providers)
}

/// Relative path with separators replaced by dots and the extension
/// stripped: `pkg/sub/mod.py` becomes `pkg.sub.mod`.
fn dotted_identifier(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModuleInfo;

    fn module(path: &str, imports: &[&str]) -> ModuleInfo {
        ModuleInfo {
            path: PathBuf::from(path),
            doc: None,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: imports.iter().map(|imp| imp.to_string()).collect(),
            metrics: None,
        }
    }

    #[test]
    fn most_specific_candidate_wins() {
        let repo = Path::new("/repo");
        let modules = vec![
            module("/repo/app.py", &["pkg.sub.Thing"]),
            module("/repo/pkg/sub.py", &[]),
            module("/repo/pkg.py", &[]),
        ];
        let graph = dependency_graph(&modules, repo, Language::Python).unwrap();

        let deps = graph.dependencies(Path::new("/repo/app.py")).unwrap();
        assert_eq!(deps.len(), 1);
        assert!(deps.contains(Path::new("/repo/pkg/sub.py")));
    }

    #[test]
    fn mutual_imports_produce_both_edges_without_self_edges() {
        let repo = Path::new("/repo");
        let modules = vec![
            module("/repo/alpha.py", &["beta"]),
            module("/repo/beta.py", &["alpha"]),
        ];
        let graph = dependency_graph(&modules, repo, Language::Python).unwrap();

        assert!(graph
            .dependencies(Path::new("/repo/alpha.py"))
            .unwrap()
            .contains(Path::new("/repo/beta.py")));
        assert!(graph
            .dependencies(Path::new("/repo/beta.py"))
            .unwrap()
            .contains(Path::new("/repo/alpha.py")));

        for (source, targets) in graph.iter() {
            assert!(!targets.contains(source));
        }
    }

    #[test]
    fn every_module_is_a_key_even_without_dependencies() {
        let repo = Path::new("/repo");
        let modules = vec![
            module("/repo/lonely.py", &["nonexistent.thing"]),
            module("/repo/other.py", &[]),
        ];
        let graph = dependency_graph(&modules, repo, Language::Python).unwrap();

        assert_eq!(graph.module_count(), 2);
        assert!(graph
            .dependencies(Path::new("/repo/lonely.py"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn self_imports_are_filtered() {
        let repo = Path::new("/repo");
        let modules = vec![module("/repo/solo.py", &["solo"])];
        let graph = dependency_graph(&modules, repo, Language::Python).unwrap();
        assert!(graph
            .dependencies(Path::new("/repo/solo.py"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn csharp_namespaces_link_modules_sharing_a_namespace() {
        let repo = Path::new("/repo");
        let modules = vec![
            module("/repo/A.cs", &["ns:Core.Models"]),
            module("/repo/B.cs", &["ns:Core.Models", "ns:Core.Util"]),
        ];
        let graph = dependency_graph(&modules, repo, Language::CSharp).unwrap();

        // Both modules declare Core.Models, so each resolves to the other.
        assert!(graph
            .dependencies(Path::new("/repo/A.cs"))
            .unwrap()
            .contains(Path::new("/repo/B.cs")));
        assert!(graph
            .dependencies(Path::new("/repo/B.cs"))
            .unwrap()
            .contains(Path::new("/repo/A.cs")));
    }

    #[test]
    fn dotted_identifier_strips_extension_and_joins_with_dots() {
        assert_eq!(dotted_identifier(Path::new("pkg/sub/mod.py")), "pkg.sub.mod");
        assert_eq!(dotted_identifier(Path::new("top.py")), "top");
    }

    #[test]
    fn paths_returns_sorted_union_of_sources_and_targets() {
        let mut graph = DependencyGraph::default();
        graph.insert_module(PathBuf::from("/repo/z.py"));
        graph.add_edge(Path::new("/repo/z.py"), PathBuf::from("/repo/a.py"));
        let paths = graph.paths();
        assert_eq!(
            paths,
            vec![&PathBuf::from("/repo/a.py"), &PathBuf::from("/repo/z.py")]
        );
    }
}
