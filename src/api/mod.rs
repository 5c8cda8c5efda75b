//! REST routes.
//!
//! [`AppState`] holds the shared database connection, the summarizer and the
//! config. [`router`] wires every route; handlers live in one file per path.

pub mod error;
pub mod generate_summary;
pub mod health;
pub mod history;
pub mod identity;
pub mod session_chat;
pub mod subscription;
pub mod users;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use rusqlite::Connection;

use crate::config::EchoConfig;
use crate::summary::Summarizer;
use error::DbCallError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    summarizer: Arc<dyn Summarizer>,
    config: Arc<EchoConfig>,
}

impl AppState {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        summarizer: Arc<dyn Summarizer>,
        config: Arc<EchoConfig>,
    ) -> Self {
        Self {
            db,
            summarizer,
            config,
        }
    }

    pub fn config(&self) -> &EchoConfig {
        &self.config
    }

    pub fn summarizer(&self) -> &dyn Summarizer {
        self.summarizer.as_ref()
    }

    /// Run a synchronous database call on the blocking pool, racing it against
    /// `server.db_timeout_ms`.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, DbCallError>
    where
        F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let task = tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            f(&conn)
        });

        let timeout = Duration::from_millis(self.config.server.db_timeout_ms);
        match tokio::time::timeout(timeout, task).await {
            Err(_) => {
                tracing::warn!(timeout_ms = self.config.server.db_timeout_ms, "database call timed out");
                Err(DbCallError::Timeout)
            }
            Ok(Err(join)) => Err(anyhow::anyhow!("db task failed: {join}").into()),
            Ok(Ok(result)) => result.map_err(DbCallError::Failed),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/history",
            get(history::list_history).post(history::save_history),
        )
        .route(
            "/api/subscription",
            get(subscription::get_usage).post(subscription::update_usage),
        )
        .route("/api/users", post(users::sync_user))
        .route(
            "/api/session-chat",
            get(session_chat::get_sessions).post(session_chat::create_session),
        )
        .route(
            "/api/generate-summary",
            post(generate_summary::generate_summary),
        )
        .with_state(state)
}
