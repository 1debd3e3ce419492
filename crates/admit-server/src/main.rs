//! ADMIT server binary
//!
//! Bootstrap order matters: configuration and the persistent store must be
//! good, and in channel mode the certificate and key must load, before the
//! listener binds. Any failure up to that point aborts; after it, failures
//! stay inside their connection.

use admit_config::{Cli, ConfigLoader, ServerConfig};
use admit_persistence::{ApplicationStore, Database, DatabaseConfig, NumberingStrategy};
use admit_server_core::{init_logging, AppState, ConnectionDispatcher};
use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.generate_config {
        ConfigLoader::create_sample_config(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    let db = Database::new(DatabaseConfig {
        path: config.storage.path.clone(),
        max_connections: config.storage.max_connections,
        connection_timeout: Duration::from_secs(30),
        enable_wal: true,
    })
    .await
    .context("failed to open the application store")?;
    db.migrate().await.context("failed to run migrations")?;
    db.health_check()
        .await
        .context("application store is not reachable")?;

    let strategy = match config.storage.numbering.as_str() {
        "temporal" => NumberingStrategy::Temporal,
        _ => NumberingStrategy::Sequence,
    };
    let store = ApplicationStore::new(
        db.pool().clone(),
        config.storage.number_prefix.clone(),
        strategy,
    );

    let (state, tls) = AppState::from_config(&config, store)
        .context("failed to initialize the request pipeline")?;
    let dispatcher = ConnectionDispatcher::new(state, tls, config.limits.max_connections);

    let bind_addr = config.bind_address()?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, mode = ?config.auth.mode, "admit-server started");

    tokio::select! {
        _ = dispatcher.serve(listener) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, draining connections");
        }
    }

    dispatcher.drain().await;
    db.close().await;
    info!("admit-server stopped");

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::from_file(path)?,
        None => ConfigLoader::load()?,
    };

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(bind) = &cli.bind {
        config.network.bind_address = bind.clone();
    }

    // Overrides can invalidate a previously valid file
    config.validate()?;
    Ok(config)
}
