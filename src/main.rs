// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vitals-Tracker API Server
//!
//! Stores personal health measurements per account and serves cached
//! per-type statistics over them.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitals_tracker::{
    config::{Config, StoreBackend},
    db::{KvStore, MemoryStore, RedisStore},
    time_utils::system_clock,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        environment = %config.environment,
        backend = ?config.store_backend,
        require_https = config.require_https,
        "Starting Vitals-Tracker API"
    );

    // Connect to the key-value store; unreachable at startup is fatal
    let kv: Arc<dyn KvStore> = match config.store_backend {
        StoreBackend::Redis => Arc::new(
            RedisStore::connect(&config.store_url, config.store_timeout)
                .await
                .context("Failed to connect to Redis")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    kv.ping().await.context("Key-value store is unreachable")?;

    // Build shared state
    let state = Arc::new(
        AppState::new(config.clone(), kv, system_clock())
            .context("Failed to initialize application state")?,
    );

    // Build router
    let app = vitals_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vitals_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
