use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "kiwi",
    version,
    about = "Extracts Chinese literals from front-end sources and rewrites them to I18N lookups",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract Chinese literals and rewrite sources in place
    Extract {
        /// Target: a directory, or a comma-separated file list
        #[arg(default_value = "./")]
        path: String,

        /// Key prefix; a leading `I18N.` segment is stripped
        #[arg(short, long)]
        prefix: Option<String>,

        /// Also handle .html files
        #[arg(long, default_value = "false")]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Extract { path, prefix, html } => {
            tracing::info!(
                path = %path,
                prefix = ?prefix,
                html = %html,
                "Starting extract command"
            );
            kiwi_intl::commands::extract(path, prefix, html).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("kiwi_intl=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("kiwi_intl=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
