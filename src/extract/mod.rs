//! Per-dialect Chinese-literal extractors
//!
//! Each supported dialect gets a thin adapter that parses the source, walks
//! it, and reports [`SpanRecord`]s with byte offsets into the original file.
//! The dispatcher routes a file to its extractor by extension; the normalizer
//! drops nested spans and orders the survivors for back-to-front rewriting.

pub mod ecma;
pub mod html;
pub mod markup;
pub mod vue;

use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::KiwiConfig;
use crate::error::Result;

/// One Chinese literal found in a source file
///
/// `range` is a half-open byte interval into the original source. For string
/// and template literals it includes the surrounding delimiters; for markup
/// text it covers the raw text node. `text` is the literal as it should
/// appear in the catalog: delimiters stripped, and whitespace-trimmed for
/// markup text nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRecord {
    /// Catalog text of the literal
    pub text: String,

    /// Half-open byte interval into the original source
    pub range: Range<usize>,

    /// Whether the literal was quote- or backtick-delimited in its host
    /// language, as opposed to naked markup text or interpolation prose
    pub is_string: bool,
}

impl SpanRecord {
    pub fn new(text: impl Into<String>, range: Range<usize>, is_string: bool) -> Self {
        Self {
            text: text.into(),
            range,
            is_string,
        }
    }

    /// Shift the span by a section offset (embedded scripts, SFC sections)
    #[must_use]
    pub fn offset(mut self, by: usize) -> Self {
        self.range = self.range.start + by..self.range.end + by;
        self
    }
}

/// A file together with its normalized spans, sorted by descending start
#[derive(Debug, Clone)]
pub struct FileWorkItem {
    pub path: std::path::PathBuf,
    pub spans: Vec<SpanRecord>,
}

/// Source dialects the dispatcher recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// ECMAScript superset with markup expressions and decorators (.js/.jsx)
    Script,
    /// Typed script with markup expressions (.ts/.tsx and anything else)
    TypedScript,
    /// Standalone markup (.html)
    Html,
    /// Single-file component (.vue)
    Component,
}

/// Select the dialect for a path by suffix
#[must_use]
pub fn dialect_for(path: &Path) -> Dialect {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => Dialect::Html,
        Some("vue") => Dialect::Component,
        Some("js") | Some("jsx") => Dialect::Script,
        _ => Dialect::TypedScript,
    }
}

/// True when the string contains at least one CJK unified ideograph
/// (U+4E00..U+9FFF)
#[must_use]
pub fn contains_chinese(text: &str) -> bool {
    text.chars().any(is_chinese_char)
}

/// True for a single code point in U+4E00..U+9FFF
#[must_use]
pub fn is_chinese_char(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Matcher for contiguous runs of Chinese characters
pub(crate) fn chinese_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\x{4e00}-\x{9fff}]+").expect("Invalid regex pattern"))
}

/// Extract spans from one file, dispatching by dialect, and normalize them
pub fn extract_file(path: &Path, source: &str, config: &KiwiConfig) -> Result<Vec<SpanRecord>> {
    let spans = match dialect_for(path) {
        Dialect::Html => html::extract(source),
        Dialect::Component => vue::extract(path, source, config.is_vue3())?,
        Dialect::Script => ecma::extract(path, source, ecma::ScriptKind::Script, 0)?,
        Dialect::TypedScript => ecma::extract(path, source, ecma::ScriptKind::TypedScript, 0)?,
    };

    for span in &spans {
        if span.range.start >= span.range.end || span.range.end > source.len() {
            return Err(crate::error::ExtractError::SpanOutOfBounds {
                path: path.to_path_buf(),
                start: span.range.start,
                end: span.range.end,
            }
            .into());
        }
    }

    Ok(normalize(spans))
}

/// Keep only maximal spans and sort them in descending start order
///
/// A span is dropped when another span's range contains it with at least one
/// strictly bracketing endpoint. Descending order lets the rewriter apply
/// edits back-to-front without invalidating remaining offsets.
#[must_use]
pub fn normalize(spans: Vec<SpanRecord>) -> Vec<SpanRecord> {
    let mut kept: Vec<SpanRecord> = Vec::with_capacity(spans.len());

    'outer: for (i, span) in spans.iter().enumerate() {
        for (j, other) in spans.iter().enumerate() {
            if i == j {
                continue;
            }
            let encloses = other.range.start <= span.range.start
                && other.range.end >= span.range.end
                && (other.range.start < span.range.start || other.range.end > span.range.end);
            if encloses {
                continue 'outer;
            }
        }
        // equal-range duplicates collapse to the first occurrence
        if kept.iter().any(|k| k.range == span.range) {
            continue;
        }
        kept.push(span.clone());
    }

    kept.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    kept
}
