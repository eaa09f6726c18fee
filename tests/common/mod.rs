//! Common test utilities

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kiwi_intl::config::KiwiConfig;
use kiwi_intl::error::{Result, TranslateError};
use kiwi_intl::translate::KeyTranslator;
use tempfile::TempDir;

/// A throwaway project rooted in a temp directory, with an absolute
/// language-pack path so walks and writes stay inside it
pub fn setup_project() -> (TempDir, KiwiConfig) {
    let dir = TempDir::new().unwrap();
    let config = KiwiConfig {
        kiwi_dir: dir.path().join(".kiwi"),
        ..Default::default()
    };
    (dir, config)
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

pub fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Translator that always fails, for skip-path tests
#[allow(dead_code)]
pub struct FailingTranslator;

#[async_trait]
impl KeyTranslator for FailingTranslator {
    async fn translate_batch(&self, _fragments: &[String]) -> Result<Vec<String>> {
        Err(TranslateError::Malformed(String::from("provider down")).into())
    }
}
