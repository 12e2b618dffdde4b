// Chunk policy: assigns modules to manifest/vendor/entry chunks

use crate::core::mode::{ModeConfig, SplitThresholds};
use crate::core::pages::PageRegistry;
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Synthetic entry loaded before every page
pub const POLYFILL_ENTRY: &str = "babel-polyfill";
pub const MANIFEST_CHUNK: &str = "manifest";
pub const VENDOR_CHUNK: &str = "vendor";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChunkName {
    /// Module-resolution runtime only
    Manifest,
    Vendor,
    Polyfill,
    Page(String),
}

impl ChunkName {
    pub fn as_str(&self) -> &str {
        match self {
            ChunkName::Manifest => MANIFEST_CHUNK,
            ChunkName::Vendor => VENDOR_CHUNK,
            ChunkName::Polyfill => POLYFILL_ENTRY,
            ChunkName::Page(id) => id,
        }
    }

    /// Script load order for a page: runtime and vendor before page code
    pub fn load_order(page_id: &str) -> Vec<ChunkName> {
        vec![
            ChunkName::Manifest,
            ChunkName::Vendor,
            ChunkName::Polyfill,
            ChunkName::Page(page_id.to_string()),
        ]
    }
}

impl std::fmt::Display for ChunkName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChunkName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Runtime,
    Vendor,
    Entry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSpec {
    pub name: ChunkName,
    pub kind: ChunkKind,
    pub depends_on: Vec<ChunkName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkGraph {
    pub chunks: Vec<ChunkSpec>,
    /// Vendor/manifest extraction applied (prod only)
    pub splitting: bool,
}

impl ChunkGraph {
    pub fn get(&self, name: &ChunkName) -> Option<&ChunkSpec> {
        self.chunks.iter().find(|chunk| &chunk.name == name)
    }

    pub fn depends_on(&self, name: &ChunkName) -> &[ChunkName] {
        self.get(name)
            .map(|chunk| chunk.depends_on.as_slice())
            .unwrap_or(&[])
    }
}

/// Static import edges between modules
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    edges: HashMap<PathBuf, Vec<PathBuf>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dependency(&mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) {
        let to = to.into();
        self.edges.entry(to.clone()).or_default();
        self.edges.entry(from.into()).or_default().push(to);
    }

    pub fn add_module(&mut self, module: impl Into<PathBuf>) {
        self.edges.entry(module.into()).or_default();
    }

    pub fn dependencies(&self, module: &Path) -> &[PathBuf] {
        self.edges.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn modules(&self) -> impl Iterator<Item = &PathBuf> {
        self.edges.keys()
    }
}

/// Per-entry reachability, computed once with one forward walk per entry
#[derive(Debug, Clone, Default)]
pub struct EntryGraph {
    entries: Vec<(ChunkName, HashSet<PathBuf>)>,
}

impl EntryGraph {
    pub fn build(graph: &ModuleGraph, roots: &[(ChunkName, PathBuf)]) -> Self {
        let entries = roots
            .iter()
            .map(|(name, root)| (name.clone(), reachable_from(graph, root)))
            .collect();
        Self { entries }
    }

    /// Distinct entries reaching `module`, in entry declaration order
    pub fn entries_reaching(&self, module: &Path) -> Vec<&ChunkName> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|(_, reached)| reached.contains(module))
            .map(|(name, _)| name)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn modules(&self) -> HashSet<&PathBuf> {
        self.entries.iter().flat_map(|(_, reached)| reached.iter()).collect()
    }
}

fn reachable_from(graph: &ModuleGraph, root: &Path) -> HashSet<PathBuf> {
    let mut reached = HashSet::new();
    let mut queue = VecDeque::from([root.to_path_buf()]);

    while let Some(module) = queue.pop_front() {
        if !reached.insert(module.clone()) {
            continue;
        }
        for dep in graph.dependencies(&module) {
            if !reached.contains(dep) {
                queue.push_back(dep.clone());
            }
        }
    }

    reached
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkAssignment {
    Vendor,
    Entry(ChunkName),
    /// No splitting: every reaching entry bundles its own copy
    Inlined(Vec<ChunkName>),
    Unreachable,
}

#[derive(Debug, Clone)]
pub struct ChunkPolicy {
    dependency_root: PathBuf,
    split: Option<SplitThresholds>,
}

impl ChunkPolicy {
    pub fn new(dependency_root: impl Into<PathBuf>, split: Option<SplitThresholds>) -> Self {
        Self {
            dependency_root: dependency_root.into(),
            split,
        }
    }

    pub fn for_mode(mode: &ModeConfig, dependency_root: impl Into<PathBuf>) -> Self {
        Self::new(dependency_root, mode.split)
    }

    pub fn dependency_root(&self) -> &Path {
        &self.dependency_root
    }

    pub fn splitting(&self) -> bool {
        self.split.is_some()
    }

    /// Installed third-party script
    pub fn is_dependency(&self, module: &Path) -> bool {
        let root_name = self
            .dependency_root
            .file_name()
            .unwrap_or_else(|| self.dependency_root.as_os_str());
        let in_root = module.starts_with(&self.dependency_root)
            || module.components().any(|c| c.as_os_str() == root_name);
        in_root && module.extension() == Some(OsStr::new("js"))
    }

    /// Depends only on `module` and the immutable entry graph.
    pub fn classify(&self, module: &Path, graph: &EntryGraph) -> ChunkAssignment {
        let reaching = graph.entries_reaching(module);

        match self.split {
            Some(thresholds) => {
                if self.is_dependency(module) || reaching.len() >= thresholds.min_entries {
                    ChunkAssignment::Vendor
                } else if let Some(entry) = reaching.first() {
                    ChunkAssignment::Entry((*entry).clone())
                } else {
                    ChunkAssignment::Unreachable
                }
            }
            None if reaching.is_empty() => ChunkAssignment::Unreachable,
            None => ChunkAssignment::Inlined(reaching.into_iter().cloned().collect()),
        }
    }

    /// Classify every reachable module; modules are independent so this runs in parallel
    pub fn classify_all(&self, graph: &EntryGraph) -> BTreeMap<PathBuf, ChunkAssignment> {
        let modules: Vec<&PathBuf> = graph.modules().into_iter().collect();
        modules
            .par_iter()
            .map(|module| ((*module).clone(), self.classify(module, graph)))
            .collect()
    }

    /// Declared chunks: manifest -> [vendor], vendor, polyfill, one per page
    pub fn chunk_graph(&self, pages: &PageRegistry) -> ChunkGraph {
        let mut chunks = vec![
            ChunkSpec {
                name: ChunkName::Manifest,
                kind: ChunkKind::Runtime,
                depends_on: vec![ChunkName::Vendor],
            },
            ChunkSpec {
                name: ChunkName::Vendor,
                kind: ChunkKind::Vendor,
                depends_on: Vec::new(),
            },
            ChunkSpec {
                name: ChunkName::Polyfill,
                kind: ChunkKind::Entry,
                depends_on: Vec::new(),
            },
        ];
        chunks.extend(pages.list().iter().map(|page| ChunkSpec {
            name: ChunkName::Page(page.id.clone()),
            kind: ChunkKind::Entry,
            depends_on: Vec::new(),
        }));

        ChunkGraph {
            chunks,
            splitting: self.splitting(),
        }
    }
}
