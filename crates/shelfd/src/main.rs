mod staging;
mod web;

use anyhow::{Context, Result};
use clap::Parser;
use shelf_store::{ContentStore, StoreConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// The shelf content-sharing service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The directory to keep the record file and uploads in.
    /// Defaults to SHELF_DATA_PATH, then ~/.shelf.
    #[arg(short, long)]
    state_dir: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match cli.state_dir {
        Some(dir) => StoreConfig::with_base_path(dir),
        None => StoreConfig::from_env(),
    };

    tracing::info!("Using data directory: {}", config.base_path.display());
    let store = ContentStore::new(config).context("Failed to initialize content store")?;

    let app = web::router(web::WebState {
        store: Arc::new(store),
    });

    let addr = format!("{}:{}", cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
