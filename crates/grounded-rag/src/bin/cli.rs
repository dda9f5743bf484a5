//! Grounded RAG command line
//!
//! Run with: cargo run -p grounded-rag -- ingest policy.pdf
//!           cargo run -p grounded-rag -- answer "What is the data retention period?"

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grounded_rag::{RagConfig, RagPipeline};

#[derive(Parser, Debug)]
#[command(
    name = "grounded-rag",
    version,
    about = "Ingest documents with PII masking and answer questions grounded in them"
)]
struct Cli {
    /// TOML config file (falls back to $GROUNDED_RAG_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, chunk, mask, embed and persist a document
    Ingest {
        /// PDF or text file to ingest
        path: PathBuf,
    },
    /// Answer a question from the persisted collection
    Answer {
        /// Natural-language question
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grounded_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = RagConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?}", config.backend);
    tracing::info!("  - Embedding model: {}", config.embedding_model_id);
    tracing::info!("  - Generation model: {}", config.generation_model_id);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunk_size,
        config.chunk_overlap
    );
    tracing::info!("  - Persist path: {}", config.persist_path.display());

    let pipeline = RagPipeline::from_config(config)?;

    match cli.command {
        Command::Ingest { path } => {
            let report = pipeline
                .ingest(&path)
                .await
                .with_context(|| format!("ingestion of {} failed", path.display()))?;
            println!(
                "Ingested {} chunks from {} into {}",
                report.chunks,
                report.source.display(),
                report.persist_path.display()
            );
        }
        Command::Answer { question } => {
            let answer = pipeline.answer(&question).await?;
            println!("QUESTION: {}", question);
            println!("ANSWER: {}", answer);
        }
    }

    Ok(())
}
