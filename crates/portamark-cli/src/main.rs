use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use portamark_config::Config;
use portamark_engine::batch::{
    BatchOptions, BatchSummary, ExportFormat, check_directory, export_documents, import_directory,
    repair_documents,
};
use portamark_engine::store::json::JsonStore;

#[derive(Parser)]
#[command(name = "portamark", about = "Markdown/structured-content pipeline", version)]
struct Cli {
    /// Config file to use instead of ~/.config/portamark/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Delay between store writes, in milliseconds
    #[arg(long, global = true)]
    throttle_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse markdown sources and upsert them into the document store
    Import {
        /// Directory of markdown sources (defaults to content_dir from config)
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },
    /// Write every stored post out as one file per document
    Export {
        /// Output directory (defaults to export_dir from config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
    /// Assign missing keys and drop null mark definitions in stored documents
    Repair {
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse markdown sources and report problems without touching the store
    Check {
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Richtext,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => ExportFormat::Markdown,
            Format::Richtext => ExportFormat::RichText,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(summary) => {
            println!(
                "{} succeeded, {} failed, {} warnings",
                summary.succeeded, summary.failed, summary.warnings
            );
            for failure in &summary.failures {
                println!("  {}: {}", failure.slug, failure.error);
            }
            if summary.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "run aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<BatchSummary> {
    let config = load_config(cli.config.as_deref())?;
    let mut opts = BatchOptions {
        throttle: Duration::from_millis(config.throttle_ms),
        ..BatchOptions::default()
    };
    if let Some(ms) = cli.throttle_ms {
        opts.throttle = Duration::from_millis(ms);
    }

    match cli.command {
        Commands::Import { content_dir } => {
            let dir = content_dir.unwrap_or(config.content_dir);
            let mut store = JsonStore::open(&config.store_dir)?;
            Ok(import_directory(&mut store, &dir, &opts)?)
        }
        Commands::Export { out_dir, format } => {
            let dir = out_dir.unwrap_or(config.export_dir);
            let mut store = JsonStore::open(&config.store_dir)?;
            Ok(export_documents(&mut store, &dir, format.into(), &opts)?)
        }
        Commands::Repair { dry_run } => {
            let mut store = JsonStore::open(&config.store_dir)?;
            let summary = repair_documents(&mut store, &opts, dry_run)?;
            println!(
                "{} documents changed, {} keys added, {} null markDefs removed{}",
                summary.documents_changed,
                summary.keys_added,
                summary.null_mark_defs_removed,
                if dry_run { " (dry run)" } else { "" }
            );
            Ok(summary.batch)
        }
        Commands::Check { content_dir } => {
            let dir = content_dir.unwrap_or(config.content_dir);
            Ok(check_directory(&dir, &opts)?)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let loaded = match path {
        Some(p) => Config::load_from_path(p)?,
        None => Config::load()?,
    };
    Ok(loaded.unwrap_or_default())
}
