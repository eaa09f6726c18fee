//! The `extract` subcommand
//!
//! Loads the project configuration from the working directory, builds the
//! pipeline and runs one pass over the target tree.

use anyhow::{Context, Result};

use crate::config::KiwiConfig;
use crate::pipeline::{ExtractOptions, Pipeline};

/// Run an extraction pass over `target`
pub async fn extract(target: String, prefix: Option<String>, html: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let config = KiwiConfig::load(&cwd)?;

    let pipeline = Pipeline::new(config).context("Failed to build extraction pipeline")?;
    let options = ExtractOptions::new(target)
        .with_prefix(prefix)
        .with_html(html);

    let stats = pipeline.run(options).await?;

    println!("Extraction complete");
    println!("  Files scanned:   {}", stats.files_scanned);
    println!("  Files rewritten: {}", stats.files_rewritten);
    println!("  Files skipped:   {}", stats.files_skipped);
    println!("  Literals found:  {}", stats.spans_found);
    println!("  Keys created:    {}", stats.keys_created);
    Ok(())
}
