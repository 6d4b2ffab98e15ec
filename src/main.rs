use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use infrastructure::config::{IngestionConfig, ServerConfig};
use infrastructure::{IngestionContainer, SearchContainer};
use presentation::http::HttpServer;

#[derive(Parser)]
#[command(name = "semantic-ats")]
#[command(about = "Resume narratives, embeddings and semantic search")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the search API
    Serve {
        /// Overrides HOST
        #[arg(long)]
        host: Option<String>,
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Process every resume in the data directory and index the results
    Ingest {
        /// Overrides DATA_DIR
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Overrides INGEST_CONCURRENCY
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => serve(host, port).await,
        Commands::Ingest {
            data_dir,
            concurrency,
        } => ingest(data_dir, concurrency).await,
    }
}

async fn serve(host: Option<String>, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let container = SearchContainer::new()?;
    container.ensure_collections().await?;

    HttpServer::new(container.search_handler.clone(), &config)?
        .run()
        .await
}

async fn ingest(
    data_dir: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = IngestionConfig::from_env()?;
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    if let Some(concurrency) = concurrency {
        config.concurrency = concurrency.max(1);
    }

    info!(
        "Starting ingestion from {} with concurrency {}",
        config.data_dir.display(),
        config.concurrency
    );

    let container = IngestionContainer::new(config)?;
    let report = container.run_ingestion_use_case.execute().await?;

    for (filename, reason) in &report.failed {
        error!("Failed to process {}: {}", filename, reason);
    }
    for (collection, points) in &report.indexed {
        info!("{}: {} points indexed", collection, points);
    }
    info!(
        "Ingestion complete: {} discovered, {} processed, {} failed, {} documents skipped",
        report.discovered,
        report.processed,
        report.failed.len(),
        report.skipped_documents
    );

    Ok(())
}
