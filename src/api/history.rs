//! `/api/history`: the caller's saved sessions.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::identity::Identity;
use super::AppState;
use crate::account::sessions::{self, NewSession, SessionOrder};
use crate::account::types::SessionRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveHistoryRequest {
    pub session_id: Option<String>,
    pub notes: Option<String>,
    pub summary: Option<String>,
    pub sentiment_analysis: Option<Value>,
    pub duration: Option<String>,
}

/// Store a structured sentiment payload as JSON text.
pub(crate) fn sentiment_text(value: Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    }
}

/// GET: all of the caller's sessions, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<SessionRecord>>, ApiError> {
    let owner = identity.user_id;
    let records = state
        .with_db(move |conn| sessions::list_sessions(conn, &owner, SessionOrder::Newest))
        .await
        .map_err(|e| e.into_api("Failed to fetch history"))?;
    Ok(Json(records))
}

/// POST: save a session whose id was generated by the client.
pub async fn save_history(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<SaveHistoryRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;

    let (Some(session_id), Some(summary)) = (
        req.session_id.filter(|s| !s.is_empty()),
        req.summary.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };

    let session = NewSession {
        session_id,
        created_by: identity.user_id,
        notes: req.notes,
        summary: Some(summary),
        sentiment: sentiment_text(req.sentiment_analysis),
        duration: req.duration,
    };
    let inserted = state
        .with_db(move |conn| sessions::save_session(conn, &session))
        .await
        .map_err(|e| e.into_api("Failed to save session"))?;

    if !inserted {
        return Err(ApiError::Conflict("Session already saved".into()));
    }
    Ok(Json(json!({ "success": true })))
}
