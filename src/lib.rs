//! kiwi-intl - Chinese literal extraction and rewrite pipeline
//!
//! Automates internationalization of front-end source trees: finds every
//! Chinese literal in script, typed-script, markup and single-file component
//! sources, assigns each one a stable lookup key, rewrites the source to
//! reference the key through the `I18N` lookup symbol, and keeps the on-disk
//! language pack in sync.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Project configuration (`kiwi-config.json`) loading
//! - [`walker`] - Candidate file enumeration with ignore lists
//! - [`extract`] - Per-dialect literal extractors and span normalization
//! - [`catalog`] - Language-pack store, renderer and writer
//! - [`translate`] - Key-translation providers (Pinyin, Google, Baidu)
//! - [`keygen`] - Key synthesis with collision avoidance
//! - [`rewrite`] - Context-sensitive source substitution and import injection
//! - [`pipeline`] - The serial per-file orchestrator
//!
//! # Example
//!
//! ```no_run
//! use kiwi_intl::config::KiwiConfig;
//! use kiwi_intl::pipeline::{ExtractOptions, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = KiwiConfig::load(std::path::Path::new("."))?;
//!     let pipeline = Pipeline::new(config)?;
//!     let stats = pipeline.run(ExtractOptions::new("./src")).await?;
//!     println!("{} files rewritten", stats.files_rewritten);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod keygen;
pub mod pipeline;
pub mod rewrite;
pub mod translate;
pub mod walker;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{CatalogStore, CatalogWriter};
    pub use crate::config::KiwiConfig;
    pub use crate::error::{Error, Result};
    pub use crate::extract::{FileWorkItem, SpanRecord};
    pub use crate::pipeline::{ExtractOptions, ExtractStats, Pipeline};
}

/// The identifier under which the host runtime exposes the key lookup.
pub const LOOKUP_SYMBOL: &str = "I18N";

pub use extract::{FileWorkItem, SpanRecord};
