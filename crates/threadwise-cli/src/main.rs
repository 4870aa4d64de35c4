//! Threadwise CLI
//!
//! Chunks a thread JSON document and prints the chunks as JSON.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use threadwise::pipeline::IngestPipelineBuilder;
use threadwise::{OpenAIProvider, SummaryMethod, Thread};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "threadwise")]
#[command(about = "Threadwise - thread-aware chunking for RAG ingestion", long_about = None)]
struct Cli {
    /// Configuration file (default: config/default.toml and config/{ENV}.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk one thread and write the chunks to stdout
    Chunk {
        /// Thread JSON document, or "-" for stdin
        #[arg(short, long)]
        input: PathBuf,

        /// Project ID stamped on every chunk
        #[arg(short, long)]
        project: String,

        /// Append a whole-thread summary chunk
        #[arg(long)]
        summary: bool,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,

        /// Override chunking.chunk_size
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Override chunking.chunk_overlap
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    match cli.command {
        Commands::Chunk {
            input,
            project,
            summary,
            pretty,
            chunk_size,
            chunk_overlap,
        } => {
            let mut chunking = config.chunking.clone();
            if let Some(chunk_size) = chunk_size {
                chunking = chunking.with_chunk_size(chunk_size);
            }
            if let Some(chunk_overlap) = chunk_overlap {
                chunking = chunking.with_chunk_overlap(chunk_overlap);
            }

            let mut builder = IngestPipelineBuilder::new().chunking(chunking);
            if summary {
                if config.summary.method == SummaryMethod::Llm {
                    builder = builder.llm_provider(Arc::new(openai_from_env()?));
                }
                builder = builder.summarization(config.summary.clone());
            }
            let pipeline = builder.build()?;

            let thread = read_thread(&input)?;
            tracing::info!(
                thread_id = %thread.thread_id,
                messages = thread.len(),
                "Chunking thread"
            );

            let chunks = pipeline.ingest(&thread, &project).await?;
            let output = if pretty {
                serde_json::to_string_pretty(&chunks)?
            } else {
                serde_json::to_string(&chunks)?
            };
            println!("{}", output);
        }
    }

    Ok(())
}

fn read_thread(input: &Path) -> Result<Thread> {
    let raw = if input == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read thread from stdin")?;
        raw
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };

    serde_json::from_str(&raw).context("Input is not a valid thread document")
}

/// Secrets come from the environment only, never from config files.
fn openai_from_env() -> Result<OpenAIProvider> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY environment variable is required for LLM summaries")?;
    let mut provider = OpenAIProvider::new(api_key)?;
    if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
        provider = provider.with_base_url(base_url);
    }
    if let Ok(model) = std::env::var("OPENAI_CHAT_MODEL") {
        provider = provider.with_chat_model(model);
    }
    Ok(provider)
}

/// Logs go to stderr; stdout carries the chunk JSON.
fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
