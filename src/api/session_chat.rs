//! `/api/session-chat`: server-side session creation and lookup.
//!
//! Unlike `/api/history`, the POST here generates the session id and always
//! produces the summary itself before storing the record.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::history::sentiment_text;
use super::identity::Identity;
use super::AppState;
use crate::account::sessions::{self, NewSession, SessionOrder};
use crate::summary;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub notes: String,
    pub sentiment_analysis: Option<Value>,
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

/// POST: summarize the notes and store a new session.
pub async fn create_session(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    summary::check_notes(&req.notes, state.config().summary.min_notes_chars)
        .map_err(|_| ApiError::BadRequest("Conversation too short".into()))?;

    let session_id = uuid::Uuid::new_v4().to_string();

    // A failed summary still saves the transcript.
    let summary_text = match state.summarizer().summarize(&req.notes).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(session = %session_id, error = %e, "summary generation failed");
            String::new()
        }
    };

    let session = NewSession {
        session_id: session_id.clone(),
        created_by: identity.user_id,
        notes: Some(req.notes),
        summary: Some(summary_text),
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

    Ok(Json(json!({ "success": true, "sessionId": session_id })))
}

/// GET: one session by `sessionId`, or all of the caller's sessions oldest first.
pub async fn get_sessions(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    let owner = identity.user_id;

    if let Some(session_id) = query.session_id.filter(|s| !s.is_empty()) {
        let record = state
            .with_db(move |conn| sessions::get_session(conn, &session_id, &owner))
            .await
            .map_err(|e| e.into_api("Failed to fetch sessions"))?;
        return match record {
            Some(record) => Ok(Json(record).into_response()),
            None => Err(ApiError::NotFound("Session not found".into())),
        };
    }

    let records = state
        .with_db(move |conn| sessions::list_sessions(conn, &owner, SessionOrder::Oldest))
        .await
        .map_err(|e| e.into_api("Failed to fetch sessions"))?;
    Ok(Json(records).into_response())
}
