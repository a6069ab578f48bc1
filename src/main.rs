use api_client::{HttpSource, LocalSource, RecordSource, full_directory};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use engine::{IngestOptions, ResultSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use anyhow::Context;

/// The main entry point for the Fundscope generator.
#[tokio::main]
async fn main() {
    // Load environment variables from a .env file, if one exists
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command. Only a failure to obtain the firm
    // directory (or to write the output) is fatal; individual firms that
    // fail to fetch are skipped inside the pipeline.
    match cli.command {
        Commands::Generate(args) => {
            if let Err(e) = handle_generate(args).await {
                error!("generation failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Cross-sectional co-investment statistics over a corpus of firm records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest every firm record and write the computed result set.
    Generate(GenerateArgs),
}

#[derive(Parser)]
struct GenerateArgs {
    /// Fetch from the remote API instead of the local filesystem.
    #[arg(long)]
    remote: bool,

    /// Path to local data on the filesystem.
    #[arg(long, default_value = "./data")]
    path: PathBuf,

    /// Number of workers to fetch with (overrides config.toml).
    #[arg(long)]
    workers: Option<usize>,

    /// A file listing firm permalinks one per line, instead of walking the
    /// remote directory.
    #[arg(long)]
    firms: Option<PathBuf>,

    /// Mirror every downloaded record under the data path, so a later run
    /// can use it without --remote.
    #[arg(long)]
    save: bool,

    /// Directory the result set is written to.
    #[arg(long, default_value = "./output")]
    out: PathBuf,

    /// CrunchBase API key; falls back to CRUNCHBASE_API_KEY.
    #[arg(long)]
    key: Option<String>,
}

// ==============================================================================
// Generate Command Logic
// ==============================================================================

/// Handles the orchestration of one full generation run.
async fn handle_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let settings = configuration::load_config()?;

    let source: Arc<dyn RecordSource> = if args.remote {
        let key = args
            .key
            .or_else(|| std::env::var("CRUNCHBASE_API_KEY").ok())
            .or_else(|| settings.api.key.clone())
            .context("remote mode needs an API key (--key or CRUNCHBASE_API_KEY)")?;
        let save_root = args.save.then(|| args.path.clone());
        Arc::new(HttpSource::new(&settings.api, &key, save_root))
    } else {
        Arc::new(LocalSource::new(args.path.clone()))
    };

    let permalinks = match &args.firms {
        Some(file) => read_permalink_file(file).await?,
        None => full_directory(source.as_ref())
            .await
            .context("failed to retrieve the firm directory")?
            .into_iter()
            .map(|entry| entry.permalink)
            .collect(),
    };
    info!(firms = permalinks.len(), "starting ingestion");

    let opts = IngestOptions {
        workers: args.workers.unwrap_or(settings.ingest.workers),
        min_year: settings.stats.min_year,
        max_year: Utc::now().year(),
    };
    let result = engine::run(source, permalinks, opts).await?;

    write_result_set(&args.out, &result).await?;
    info!(
        firms = result.firms.len(),
        out = %args.out.display(),
        "result set written"
    );

    Ok(())
}

/// Reads a firm list file: one permalink per line, blank lines skipped.
async fn read_permalink_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read firm list {}", path.display()))?;
    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Writes the serializable portion of the result set: the typeahead
/// payload (in its compact wire shape) and one JSON document per firm.
async fn write_result_set(out: &Path, result: &ResultSet) -> anyhow::Result<()> {
    let firms_dir = out.join("firms");
    tokio::fs::create_dir_all(&firms_dir).await?;

    let typeahead = serde_json::json!({
        "a": result.name_list,
        "b": result.name_prefixes,
    });
    tokio::fs::write(out.join("index.json"), serde_json::to_vec(&typeahead)?).await?;

    for (permalink, firm) in &result.firms {
        let path = firms_dir.join(format!("{}.json", permalink));
        tokio::fs::write(path, serde_json::to_vec(firm)?).await?;
    }

    Ok(())
}
