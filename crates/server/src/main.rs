//! shellcache host entry point.
//!
//! Boots the offline worker and exposes its events as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_client::HttpFetcher;
use shellcache_core::{AppConfig, CacheDb, Worker};
use tracing_subscriber::EnvFilter;

mod handler;
mod notify;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        store = %config.current_store_name(),
        origin = %config.origin,
        "Starting shellcache host on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let fetcher = HttpFetcher::from_config(&config)?;
    let notifications = Arc::new(notify::LoggingHost::default());
    let worker = Arc::new(Worker::new(config, Arc::new(db), Arc::new(fetcher), notifications)?);

    let handler = handler::ShellcacheHost::new(Arc::clone(&worker));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    worker.settle().await;

    Ok(())
}
