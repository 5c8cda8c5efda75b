use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::db;

/// GET /health: liveness plus a database integrity probe.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = state
        .with_db(db::check_database_health)
        .await
        .map_err(|e| e.into_api("Health check failed"))?;

    Ok(Json(json!({
        "status": if report.integrity_ok { "ok" } else { "degraded" },
        "schemaVersion": report.schema_version,
        "users": report.user_count,
        "sessions": report.session_count,
    })))
}
