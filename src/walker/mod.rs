//! Candidate file enumeration
//!
//! A target is a comma-separated list: a leading directory token triggers a
//! recursive walk honoring the configured ignore globs; otherwise the tokens
//! are taken as an explicit file list. Files under the language-pack
//! directory are always excluded. Enumeration never propagates I/O errors;
//! unreadable or missing entries are simply skipped.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;
use wax::{Glob, Pattern};

use crate::config::KiwiConfig;

/// Extensions handled by default
const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "vue"];

/// Enumerates the source files of one extraction run
pub struct FileWalker {
    ignore_dir: Vec<Glob<'static>>,
    ignore_file: Vec<Glob<'static>>,
    exclude_dir: PathBuf,
    include_html: bool,
}

impl FileWalker {
    #[must_use]
    pub fn new(config: &KiwiConfig, include_html: bool) -> Self {
        Self {
            ignore_dir: compile_globs(&config.ignore_dir),
            ignore_file: compile_globs(&config.ignore_file),
            exclude_dir: config.abs_kiwi_dir(),
            include_html,
        }
    }

    /// Enumerate candidate files for a comma-separated target
    #[must_use]
    pub fn walk(&self, target: &str) -> Vec<PathBuf> {
        let tokens: Vec<&str> = target
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let mut files = Vec::new();
        match tokens.first() {
            Some(first) if Path::new(first).is_dir() => {
                self.walk_directory(Path::new(first), &mut files);
            }
            _ => {
                for token in &tokens {
                    let path = Path::new(token);
                    if path.is_file() {
                        files.push(path.to_path_buf());
                    }
                }
            }
        }

        let mut files: Vec<PathBuf> = files
            .into_iter()
            .filter(|p| self.accepts(p))
            .collect();
        files.sort();
        files
    }

    fn walk_directory(&self, root: &Path, files: &mut Vec<PathBuf>) {
        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !self.ignore_dir.iter().any(|g| g.is_match(name.as_ref()))
        });

        for entry in walker.filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    /// Extension, ignore-file and language-pack-directory filters
    fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let known =
            DEFAULT_EXTENSIONS.contains(&ext) || (self.include_html && ext == "html");
        if !known {
            return false;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if self.ignore_file.iter().any(|g| g.is_match(name)) {
                return false;
            }
        }

        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let exclude = std::fs::canonicalize(&self.exclude_dir)
            .unwrap_or_else(|_| self.exclude_dir.clone());
        !absolute.starts_with(&exclude)
    }
}

fn compile_globs(patterns: &[String]) -> Vec<Glob<'static>> {
    patterns
        .iter()
        .filter_map(|pattern| match Glob::new(pattern) {
            Ok(glob) => Some(glob.into_owned()),
            Err(err) => {
                warn!(pattern = %pattern, error = %err, "ignoring invalid glob");
                None
            }
        })
        .collect()
}
