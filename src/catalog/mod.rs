//! Language-pack store and writer
//!
//! The store is the in-memory view of the catalog: a flattened, ordered
//! `dotted key -> text` map loaded from the aggregator's namespace imports.
//! It is owned by the pipeline and passed by reference; the writer performs
//! write-through so the mirror and the disk never diverge.

pub mod tree;
pub mod writer;

pub use tree::Tree;
pub use writer::CatalogWriter;

use std::collections::HashMap;
use std::path::Path;

use swc_ecma_ast::{ImportSpecifier, ModuleDecl, ModuleItem};
use tracing::warn;

use crate::config::KiwiConfig;
use crate::error::Result;
use crate::extract::ecma::{self, ScriptKind};

/// In-memory view of the key→text catalog
#[derive(Debug, Default)]
pub struct CatalogStore {
    /// Flattened entries in stable insertion order
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl CatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the catalog beneath `<kiwiDir>/<srcLang>/`
    ///
    /// The aggregator file names the registered namespaces; each namespace
    /// file's default export is flattened beneath its namespace. A missing
    /// aggregator yields an empty store (nothing has been extracted yet).
    /// The files are read fresh from disk on every load.
    pub fn load(config: &KiwiConfig) -> Result<Self> {
        let mut store = Self::new();
        let aggregator = config.aggregator_path();
        if !aggregator.is_file() {
            return Ok(store);
        }

        let source = std::fs::read_to_string(&aggregator)?;
        for namespace in namespaces_of_aggregator(&aggregator, &source)? {
            let path = config.namespace_path(&namespace);
            let Ok(content) = std::fs::read_to_string(&path) else {
                warn!(namespace = %namespace, path = %path.display(), "namespace file missing, skipping");
                continue;
            };
            match Tree::parse(&path, &content) {
                Ok(tree) => {
                    for (key, value) in tree.flatten(&namespace) {
                        store.insert(key, value);
                    }
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "malformed namespace file, skipping");
                }
            }
        }

        Ok(store)
    }

    /// First key bound to this value, in insertion order
    #[must_use]
    pub fn lookup_by_value(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| v == value)
            .map(|(k, _)| k.as_str())
    }

    /// Value bound to this key
    #[must_use]
    pub fn lookup_by_key(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Current key set, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bind a key in the mirror, overwriting any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

}

/// Namespaces registered in the aggregator, in import order
fn namespaces_of_aggregator(path: &Path, source: &str) -> Result<Vec<String>> {
    let parsed = ecma::parse(path, source, ScriptKind::TypedScript)?;

    let mut namespaces = Vec::new();
    for item in &parsed.module.body {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            continue;
        };
        let has_default = import
            .specifiers
            .iter()
            .any(|s| matches!(s, ImportSpecifier::Default(_)));
        if !has_default {
            continue;
        }
        let src = import.src.value.to_string();
        let stem = Path::new(&src)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&src)
            .to_string();
        namespaces.push(stem);
    }
    Ok(namespaces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_round_trip() {
        let mut store = CatalogStore::new();
        store.insert("common.tiJiao", "提交");
        store.insert("common.quXiao", "取消");
        assert_eq!(store.lookup_by_key("common.tiJiao"), Some("提交"));
        assert_eq!(store.lookup_by_value("取消"), Some("common.quXiao"));
        assert_eq!(store.lookup_by_value("确定"), None);
        assert!(store.contains_key("common.quXiao"));
    }

    #[test]
    fn test_lookup_by_value_is_first_in_order() {
        let mut store = CatalogStore::new();
        store.insert("a.first", "重复");
        store.insert("b.second", "重复");
        assert_eq!(store.lookup_by_value("重复"), Some("a.first"));
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut store = CatalogStore::new();
        store.insert("a", "一");
        store.insert("b", "二");
        store.insert("a", "壹");
        assert_eq!(store.lookup_by_key("a"), Some("壹"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_namespaces_of_aggregator() {
        let source = "import common from './common';\nimport pages from './pages';\n\nexport default Object.assign({}, {\n  common,\n  pages,\n});\n";
        let namespaces = namespaces_of_aggregator(Path::new("index.ts"), source).unwrap();
        assert_eq!(namespaces, vec!["common", "pages"]);
    }

    #[test]
    fn test_aggregator_plain_object_form() {
        let source =
            "import menu from './menu';\n\nexport default {\n  menu,\n};\n";
        let namespaces = namespaces_of_aggregator(Path::new("index.ts"), source).unwrap();
        assert_eq!(namespaces, vec!["menu"]);
    }
}
