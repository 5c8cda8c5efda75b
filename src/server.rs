//! HTTP server initialization.
//!
//! Opens the database, builds the summarizer, and serves the API router until
//! ctrl-c.

use crate::api::{self, AppState};
use crate::config::EchoConfig;
use crate::db;
use crate::summary;
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};

/// Shared setup: open DB, create the summarizer, wrap everything for handlers.
pub fn setup_shared_state(config: EchoConfig) -> Result<AppState> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let summarizer: Arc<dyn summary::Summarizer> =
        Arc::from(summary::create_summarizer(&config.summary)?);
    tracing::info!(provider = summarizer.name(), "summarizer ready");

    Ok(AppState::new(
        Arc::new(Mutex::new(conn)),
        summarizer,
        Arc::new(config),
    ))
}

/// Serve the REST API on `server.host:server.port`.
pub async fn serve(config: EchoConfig) -> Result<()> {
    let bind_addr = config.bind_addr();
    tracing::info!(addr = %bind_addr, "starting EchoMind API server");

    let state = setup_shared_state(config)?;
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "API listening at http://{bind_addr}/api");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down API server");
        })
        .await?;

    Ok(())
}
