//! Unified error handling for the kiwi-intl crate
//!
//! Domain-specific errors ([`ExtractError`], [`TranslateError`],
//! [`CatalogError`], [`RewriteError`]) are consolidated into a single
//! [`Error`] enum. Per-file failures are recovered at the file boundary by
//! the pipeline; only configuration errors abort a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing a source dialect and extracting spans
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The dialect parser rejected the input
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A single-file component is missing a usable section
    #[error("no template or script section in {path}")]
    EmptyComponent { path: PathBuf },

    /// An extractor produced a span outside the source bounds
    #[error("span {start}..{end} out of bounds for {path}")]
    SpanOutOfBounds {
        path: PathBuf,
        start: usize,
        end: usize,
    },
}

/// Errors raised by the key-translation providers
#[derive(Error, Debug)]
pub enum TranslateError {
    /// HTTP request error
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an unusable payload
    #[error("malformed translation response: {0}")]
    Malformed(String),

    /// Provider returned a batch of the wrong length
    #[error("translator returned {got} tokens for {want} fragments")]
    LengthMismatch { want: usize, got: usize },

    /// Unknown provider name in configuration
    #[error("unknown translate provider `{0}`, expected one of Pinyin, Google, Baidu")]
    UnknownProvider(String),
}

/// Errors raised while loading or writing the language pack
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A catalog file did not contain a recognizable default export
    #[error("malformed catalog file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// A key is already bound to a different value
    #[error("duplicate key `{key}`: already bound to a different value")]
    DuplicateKey { key: String },

    /// A synthesized key has too few segments to name a namespace file
    #[error("key `{0}` has no namespace segment")]
    BadKeyShape(String),
}

/// Errors raised while rewriting source bytes
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Span ranges overlap after normalization
    #[error("overlapping spans at byte {at} in {path}")]
    OverlappingSpans { path: PathBuf, at: usize },

    /// A span no longer brackets a valid char boundary
    #[error("span {start}..{end} not on a char boundary in {path}")]
    BadBoundary {
        path: PathBuf,
        start: usize,
        end: usize,
    },

    /// The import-injection check could not parse the rewritten script
    #[error("rewritten script no longer parses in {path}: {message}")]
    Reparse { path: PathBuf, message: String },
}

/// Unified error type for the kiwi-intl crate
#[derive(Error, Debug)]
pub enum Error {
    /// Extraction errors (dialect parsing, span production)
    #[error("extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Translator errors
    #[error("translate error: {0}")]
    Translate(#[from] TranslateError),

    /// Language-pack errors
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Source rewrite errors
    #[error("rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the pipeline may continue with the next file after this error.
    ///
    /// Misconfiguration (including an unknown translate provider) aborts the
    /// run; everything else is recovered at the file boundary.
    pub fn is_per_file(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::Translate(TranslateError::UnknownProvider(_))
        )
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
