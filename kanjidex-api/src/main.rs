//! kanjidex-api - CRUD backend for a kanji learning dataset
//!
//! Serves kanji, compound words, and example sentences over HTTP, with
//! bulk import of nested dictionary entries and a denormalized read view.

use anyhow::Result;
use clap::Parser;
use kanjidex_api::{build_router, AppState};
use kanjidex_common::config;
use kanjidex_common::store::Store;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "kanjidex-api", about = "Kanji learning dataset backend")]
struct Cli {
    /// Root folder holding the database file
    #[arg(long)]
    root_folder: Option<String>,

    /// Bind address for the HTTP listener
    #[arg(long)]
    bind: Option<String>,

    /// Port for the HTTP listener
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting kanjidex-api v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let file_config = config::load_config_file().unwrap_or_default();

    let root_folder = config::resolve_root_folder(cli.root_folder.as_deref(), &file_config);
    std::fs::create_dir_all(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let store = Store::open(&db_path).await?;
    info!("✓ Connected to document store");

    let bind = cli
        .bind
        .or(file_config.bind.clone())
        .unwrap_or_else(|| config::DEFAULT_BIND.to_string());
    let port = cli.port.or(file_config.port).unwrap_or(config::DEFAULT_PORT);

    let state = AppState::new(store);
    let app = build_router(state, file_config.cors_origin.as_deref());

    let listener = tokio::net::TcpListener::bind((bind.as_str(), port)).await?;
    info!("kanjidex-api listening on http://{}:{}", bind, port);
    info!("Health check: http://{}:{}/health", bind, port);

    axum::serve(listener, app).await?;

    Ok(())
}
