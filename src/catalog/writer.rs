//! Write-through persistence of catalog entries
//!
//! A key `<namespace>.<rest…>` lands in `<kiwiDir>/<srcLang>/<namespace>.<ext>`.
//! First use of a namespace creates its file and registers it in the
//! aggregator; later writes re-emit the namespace file with the new leaf
//! bound. Every successful write also updates the in-memory store.

use std::path::Path;

use tracing::debug;

use crate::catalog::{CatalogStore, Tree};
use crate::config::KiwiConfig;
use crate::error::{CatalogError, Result};
use crate::LOOKUP_SYMBOL;

/// Persists key→text pairs into the language-pack directory
pub struct CatalogWriter {
    config: KiwiConfig,
}

impl CatalogWriter {
    #[must_use]
    pub fn new(config: KiwiConfig) -> Self {
        Self { config }
    }

    /// Persist one entry and mirror it into the store
    ///
    /// `key` may carry a leading `I18N.` segment, which is stripped. With
    /// `validate_duplicate`, binding a path that already holds a different
    /// value is an error instead of an overwrite.
    pub fn write_entry(
        &self,
        store: &mut CatalogStore,
        key: &str,
        text: &str,
        validate_duplicate: bool,
    ) -> Result<()> {
        let key = key
            .strip_prefix(&format!("{LOOKUP_SYMBOL}."))
            .unwrap_or(key);

        let (namespace, rest) = key
            .split_once('.')
            .ok_or_else(|| CatalogError::BadKeyShape(key.to_string()))?;
        if rest.is_empty() {
            return Err(CatalogError::BadKeyShape(key.to_string()).into());
        }

        // literal \n sequences become real newlines on both branches, so a
        // text's stored value never depends on whether its namespace file
        // already existed
        let text = text.replace("\\n", "\n");

        let target = self.config.namespace_path(namespace);
        let mut tree = if target.is_file() {
            let source = std::fs::read_to_string(&target)?;
            Tree::parse(&target, &source)?
        } else {
            Tree::new()
        };

        if validate_duplicate {
            if let Some(existing) = tree.get_path(rest) {
                if existing != text {
                    return Err(CatalogError::DuplicateKey {
                        key: key.to_string(),
                    }
                    .into());
                }
            }
        }

        let is_new_namespace = !target.is_file();
        tree.set_path(rest, &text);

        std::fs::create_dir_all(self.config.lang_dir())?;
        std::fs::write(&target, tree.render())?;
        debug!(key = %key, path = %target.display(), "catalog entry written");

        if is_new_namespace {
            self.register_namespace(namespace)?;
        }

        store.insert(key, text);
        Ok(())
    }

    /// Add a namespace import and member to the aggregator file
    ///
    /// Creates the aggregator on first use; otherwise edits it textually:
    /// one import line after the first import, one comma-separated member
    /// before the closing brace of the default export. Both the
    /// `Object.assign({}, { … })` and plain `{ … }` forms are tolerated.
    fn register_namespace(&self, namespace: &str) -> Result<()> {
        let aggregator = self.config.aggregator_path();

        if !aggregator.is_file() {
            let content = format!(
                "import {namespace} from './{namespace}';\n\nexport default Object.assign({{}}, {{\n  {namespace},\n}});\n"
            );
            std::fs::write(&aggregator, content)?;
            return Ok(());
        }

        let source = std::fs::read_to_string(&aggregator)?;
        if already_registered(&source, namespace) {
            return Ok(());
        }

        let import_line = format!("import {namespace} from './{namespace}';\n");
        let mut updated = match insertion_after_first_import(&source) {
            Some(at) => {
                let mut s = source.clone();
                s.insert_str(at, &import_line);
                s
            }
            None => format!("{import_line}{source}"),
        };

        let member_line = format!("  {namespace},\n");
        let Some(brace) = updated.rfind('}') else {
            return Err(CatalogError::Malformed {
                path: aggregator.clone(),
                message: String::from("no closing brace in default export"),
            }
            .into());
        };
        let line_start = updated[..brace].rfind('\n').map_or(0, |p| p + 1);
        updated.insert_str(line_start, &member_line);

        std::fs::write(&aggregator, updated)?;
        Ok(())
    }
}

fn already_registered(source: &str, namespace: &str) -> bool {
    source
        .lines()
        .any(|line| line.trim_start().starts_with("import ") && line.contains(&format!("'./{namespace}'")))
}

/// Byte offset just past the end of the first import line
fn insertion_after_first_import(source: &str) -> Option<usize> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        if line.trim_start().starts_with("import ") {
            return Some(offset + line.len());
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn test_config(dir: &Path) -> KiwiConfig {
        KiwiConfig {
            kiwi_dir: PathBuf::from(dir),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_write_creates_namespace_and_aggregator() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let writer = CatalogWriter::new(config.clone());
        let mut store = CatalogStore::new();

        writer
            .write_entry(&mut store, "common.tiJiao", "提交", false)
            .unwrap();

        let ns = std::fs::read_to_string(config.namespace_path("common")).unwrap();
        assert_eq!(ns, "export default {\n  tiJiao: '提交',\n};\n");

        let agg = std::fs::read_to_string(config.aggregator_path()).unwrap();
        assert!(agg.contains("import common from './common';"));
        assert!(agg.contains("  common,\n"));
        assert_eq!(store.lookup_by_key("common.tiJiao"), Some("提交"));
    }

    #[test]
    fn test_lookup_prefix_stripped() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let writer = CatalogWriter::new(config);
        let mut store = CatalogStore::new();

        writer
            .write_entry(&mut store, "I18N.common.queDing", "确定", false)
            .unwrap();
        assert_eq!(store.lookup_by_key("common.queDing"), Some("确定"));
    }

    #[test]
    fn test_second_namespace_registered_in_aggregator() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let writer = CatalogWriter::new(config.clone());
        let mut store = CatalogStore::new();

        writer
            .write_entry(&mut store, "common.a", "一", false)
            .unwrap();
        writer
            .write_entry(&mut store, "pages.b", "二", false)
            .unwrap();

        let agg = std::fs::read_to_string(config.aggregator_path()).unwrap();
        let import_common = agg.find("import common").unwrap();
        let import_pages = agg.find("import pages").unwrap();
        assert!(import_pages > import_common);
        assert!(agg.contains("  common,\n"));
        assert!(agg.contains("  pages,\n"));

        let reloaded = CatalogStore::load(&config).unwrap();
        assert_eq!(reloaded.lookup_by_key("common.a"), Some("一"));
        assert_eq!(reloaded.lookup_by_key("pages.b"), Some("二"));
    }

    #[test]
    fn test_existing_namespace_re_emitted_with_new_leaf() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let writer = CatalogWriter::new(config.clone());
        let mut store = CatalogStore::new();

        writer
            .write_entry(&mut store, "common.login.submit", "提交", false)
            .unwrap();
        writer
            .write_entry(&mut store, "common.login.cancel", "取消", false)
            .unwrap();

        let ns = std::fs::read_to_string(config.namespace_path("common")).unwrap();
        assert_eq!(
            ns,
            "export default {\n  login: {\n    submit: '提交',\n    cancel: '取消',\n  },\n};\n"
        );
    }

    #[test]
    fn test_duplicate_validation() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let writer = CatalogWriter::new(config);
        let mut store = CatalogStore::new();

        writer
            .write_entry(&mut store, "common.key", "值一", true)
            .unwrap();
        // same value is fine
        writer
            .write_entry(&mut store, "common.key", "值一", true)
            .unwrap();
        // different value is a duplicate-key error
        let err = writer
            .write_entry(&mut store, "common.key", "值二", true)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Catalog(CatalogError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_newline_deescape_on_both_branches() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let writer = CatalogWriter::new(config.clone());
        let mut store = CatalogStore::new();

        // first write creates the namespace file
        writer
            .write_entry(&mut store, "common.multi", "第一行\\n第二行", false)
            .unwrap();
        assert_eq!(store.lookup_by_key("common.multi"), Some("第一行\n第二行"));

        // second write re-emits the existing file; same de-escape applies
        writer
            .write_entry(&mut store, "common.other", "上\\n下", false)
            .unwrap();
        assert_eq!(store.lookup_by_key("common.other"), Some("上\n下"));

        let reloaded = CatalogStore::load(&config).unwrap();
        assert_eq!(reloaded.lookup_by_key("common.multi"), Some("第一行\n第二行"));
        assert_eq!(reloaded.lookup_by_key("common.other"), Some("上\n下"));
    }

    #[test]
    fn test_bad_key_shape() {
        let dir = TempDir::new().unwrap();
        let writer = CatalogWriter::new(test_config(dir.path()));
        let mut store = CatalogStore::new();
        assert!(writer
            .write_entry(&mut store, "nonamespace", "文", false)
            .is_err());
    }

}
