// Page registry: declared page ids and the source-layout convention

use crate::core::chunks::ChunkName;
use crate::utils::{MpaError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Fixed project layout shared by every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectLayout {
    pub src_dir: PathBuf,
    pub script_ext: String,
    pub static_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            script_ext: "js".to_string(),
            static_dir: PathBuf::from("static"),
            out_dir: PathBuf::from("dist"),
        }
    }
}

impl ProjectLayout {
    /// `./static/favicon.ico` under the default layout
    pub fn favicon(&self) -> PathBuf {
        Path::new(".").join(&self.static_dir).join("favicon.ico")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    pub id: String,
    pub entry_path: PathBuf,
    pub template_path: PathBuf,
}

impl PageDescriptor {
    fn from_convention(id: &str, layout: &ProjectLayout) -> Self {
        let page_dir = Path::new(".").join(&layout.src_dir).join(id);
        Self {
            id: id.to_string(),
            entry_path: page_dir.join(format!("index.{}", layout.script_ext)),
            template_path: page_dir.join(format!("{}.html", id)),
        }
    }
}

/// Chunk names every page loads besides its own
const RESERVED_CHUNKS: [ChunkName; 3] = [ChunkName::Manifest, ChunkName::Vendor, ChunkName::Polyfill];

/// Ordered, immutable set of pages. Adding a page means appending an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRegistry {
    pages: Vec<PageDescriptor>,
    layout: ProjectLayout,
}

impl PageRegistry {
    /// Build the registry from declared ids. No filesystem access happens here.
    pub fn new<I, S>(ids: I, layout: ProjectLayout) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut pages = Vec::new();

        for id in ids {
            let id = id.as_ref().trim();
            if id.is_empty() {
                return Err(MpaError::config("page id must not be empty"));
            }
            if id.contains(|c: char| c == '/' || c == '\\') {
                return Err(MpaError::config(format!(
                    "page id '{}' must not contain path separators",
                    id
                )));
            }
            if RESERVED_CHUNKS.iter().any(|chunk| chunk.as_str() == id) {
                return Err(MpaError::config(format!(
                    "page id '{}' collides with a shared chunk name",
                    id
                )));
            }
            if !seen.insert(id.to_string()) {
                return Err(MpaError::config(format!("duplicate page id '{}'", id)));
            }
            pages.push(PageDescriptor::from_convention(id, &layout));
        }

        Ok(Self { pages, layout })
    }

    pub fn list(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn get(&self, id: &str) -> Option<&PageDescriptor> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_paths() {
        let registry = PageRegistry::new(["pageA", "pageB"], ProjectLayout::default()).unwrap();
        let pages = registry.list();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].id, "pageA");
        assert_eq!(pages[0].entry_path, PathBuf::from("./src/pageA/index.js"));
        assert_eq!(pages[0].template_path, PathBuf::from("./src/pageA/pageA.html"));
        assert_eq!(pages[1].entry_path, PathBuf::from("./src/pageB/index.js"));
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let registry = PageRegistry::new(["zeta", "alpha", "mid"], ProjectLayout::default()).unwrap();
        let ids: Vec<&str> = registry.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_custom_script_extension() {
        let layout = ProjectLayout {
            script_ext: "ts".to_string(),
            ..Default::default()
        };
        let registry = PageRegistry::new(["home"], layout).unwrap();
        assert_eq!(registry.list()[0].entry_path, PathBuf::from("./src/home/index.ts"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = PageRegistry::new(["pageA", "pageA"], ProjectLayout::default());
        assert!(matches!(result, Err(MpaError::Config(_))));
    }

    #[test]
    fn test_shared_chunk_names_rejected() {
        for id in ["babel-polyfill", "vendor", "manifest"] {
            let result = PageRegistry::new(["pageA", id], ProjectLayout::default());
            assert!(matches!(result, Err(MpaError::Config(_))), "{} accepted", id);
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = PageRegistry::new(["pageA", " "], ProjectLayout::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_favicon_path() {
        assert_eq!(ProjectLayout::default().favicon(), PathBuf::from("./static/favicon.ico"));
    }
}
