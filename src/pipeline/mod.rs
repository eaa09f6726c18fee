//! The serial per-file orchestrator
//!
//! Drives the end-to-end sequence: walk → extract → translate → synthesize →
//! rewrite → persist. Files are processed strictly in order; a per-file
//! failure is logged and the run continues with the next file. Catalog
//! entries for a file are committed only after its rewritten bytes are
//! safely on disk, so the source and the language pack never disagree.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::catalog::{CatalogStore, CatalogWriter};
use crate::config::KiwiConfig;
use crate::error::{Result, TranslateError};
use crate::extract::{self, FileWorkItem};
use crate::keygen;
use crate::rewrite::{self, PreparedSpan};
use crate::translate::{self, KeyTranslator};
use crate::walker::FileWalker;
use crate::LOOKUP_SYMBOL;

/// Options of one extraction run
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Comma-separated target: a directory or an explicit file list
    pub target: String,

    /// Explicit key prefix; a leading `I18N.` segment is stripped
    pub prefix: Option<String>,

    /// Also handle `.html` files
    pub include_html: bool,
}

impl ExtractOptions {
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            prefix: None,
            include_html: false,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    #[must_use]
    pub fn with_html(mut self, include_html: bool) -> Self {
        self.include_html = include_html;
        self
    }
}

/// Summary statistics of one run
#[derive(Debug, Clone, Default)]
pub struct ExtractStats {
    pub files_scanned: usize,
    pub files_rewritten: usize,
    pub files_skipped: usize,
    pub spans_found: usize,
    pub keys_created: usize,
}

/// End-to-end extraction pipeline
pub struct Pipeline {
    config: KiwiConfig,
    translator: Box<dyn KeyTranslator>,
    writer: CatalogWriter,
}

impl Pipeline {
    /// Build a pipeline with the configured translate provider
    ///
    /// An unknown provider aborts here, before any side effects.
    pub fn new(config: KiwiConfig) -> Result<Self> {
        let translator = translate::provider_from_config(&config)?;
        Ok(Self::with_translator(config, translator))
    }

    /// Build a pipeline around an explicit translator (tests, embedding)
    #[must_use]
    pub fn with_translator(config: KiwiConfig, translator: Box<dyn KeyTranslator>) -> Self {
        let writer = CatalogWriter::new(config.clone());
        Self {
            config,
            translator,
            writer,
        }
    }

    /// Run one pass over the target tree
    pub async fn run(&self, options: ExtractOptions) -> Result<ExtractStats> {
        let mut store = CatalogStore::load(&self.config)?;
        info!(entries = store.len(), "language pack loaded");

        let prefix = options.prefix.as_deref().map(|p| {
            p.strip_prefix(&format!("{LOOKUP_SYMBOL}."))
                .unwrap_or(p)
                .to_string()
        });

        let walker = FileWalker::new(&self.config, options.include_html);
        let files = walker.walk(&options.target);
        info!(files = files.len(), target = %options.target, "extraction starting");

        // first pass: build the work items (walk, extract, normalize)
        let mut stats = ExtractStats::default();
        let mut items: Vec<FileWorkItem> = Vec::new();
        for path in files {
            stats.files_scanned += 1;
            match self.collect_item(&path) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {
                    debug!(path = %path.display(), "no Chinese literals");
                }
                Err(err) if err.is_per_file() => {
                    stats.files_skipped += 1;
                    warn!(path = %path.display(), error = %err, "file skipped");
                }
                Err(err) => return Err(err),
            }
        }

        // second pass: translate, synthesize, rewrite and persist, serially
        for item in items {
            let path = item.path.clone();
            match self.process_item(item, prefix.as_deref(), &mut store).await {
                Ok((spans, keys)) => {
                    stats.files_rewritten += 1;
                    stats.spans_found += spans;
                    stats.keys_created += keys;
                    info!(path = %path.display(), spans, keys, "file rewritten");
                }
                Err(err) if err.is_per_file() => {
                    stats.files_skipped += 1;
                    warn!(path = %path.display(), error = %err, "file skipped");
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            scanned = stats.files_scanned,
            rewritten = stats.files_rewritten,
            skipped = stats.files_skipped,
            spans = stats.spans_found,
            keys = stats.keys_created,
            "extraction finished"
        );
        Ok(stats)
    }

    /// Read and extract one file into a work item
    ///
    /// Returns `None` when the file holds no Chinese literals.
    fn collect_item(&self, path: &Path) -> Result<Option<FileWorkItem>> {
        let source = std::fs::read_to_string(path)?;
        let spans = extract::extract_file(path, &source, &self.config)?;
        if spans.is_empty() {
            return Ok(None);
        }
        Ok(Some(FileWorkItem {
            path: path.to_path_buf(),
            spans,
        }))
    }

    /// Translate, synthesize, rewrite and persist one work item
    ///
    /// Catalog commits happen strictly after the rewritten bytes are
    /// written.
    async fn process_item(
        &self,
        item: FileWorkItem,
        prefix: Option<&str>,
        store: &mut CatalogStore,
    ) -> Result<(usize, usize)> {
        let path = item.path.as_path();
        let source = std::fs::read_to_string(path)?;

        // spans are in descending-start order; the translator and the key
        // synthesizer see the literals in forward source order
        let prepared = rewrite::prepare(&source, item.spans);
        let texts: Vec<String> = prepared
            .iter()
            .rev()
            .map(|s| s.record.text.clone())
            .collect();

        let fragments: Vec<String> = texts
            .iter()
            .map(|t| translate::prepare_fragment(t))
            .collect();
        let tokens = self.translator.translate_batch(&fragments).await?;
        if tokens.len() != texts.len() {
            return Err(TranslateError::LengthMismatch {
                want: texts.len(),
                got: tokens.len(),
            }
            .into());
        }

        let assignments = keygen::synthesize_keys(store, path, prefix, &texts, &tokens)?;

        let count = prepared.len();
        let pairs: Vec<(PreparedSpan, String)> = prepared
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                let key = assignments[count - 1 - i].key.clone();
                (span, key)
            })
            .collect();

        let rewritten = rewrite::rewrite_source(path, &source, &pairs, &self.config.import_i18n)?;
        std::fs::write(path, rewritten)?;

        // commit the staged catalog entries now that the bytes are safe
        let mut keys_created = 0;
        for (assignment, text) in assignments.iter().zip(&texts) {
            if assignment.need_write {
                self.writer
                    .write_entry(store, &assignment.key, text, false)?;
                keys_created += 1;
            }
        }

        Ok((count, keys_created))
    }
}
