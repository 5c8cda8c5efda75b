//! `/api/users`: sync the authenticated caller into the users table.
//!
//! Unlike the other routes, failures here carry `success: false` next to the
//! error message.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use super::error::ApiError;
use super::identity::Identity;
use super::AppState;
use crate::account::types::User;
use crate::account::users;

#[derive(Debug, Serialize)]
pub struct SyncUserResponse {
    pub success: bool,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Error body for this route: `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct SyncUserError(ApiError);

impl From<ApiError> for SyncUserError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for SyncUserError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let error = match self.0 {
            ApiError::Unauthorized(_) => "No authenticated user".to_string(),
            ApiError::Internal {
                message,
                details: Some(details),
            } => format!("{message}: {details}"),
            other => other.to_string(),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(%error, "user sync failed");
        }
        (status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}

pub async fn sync_user(
    State(state): State<AppState>,
    identity: Result<Identity, ApiError>,
) -> Result<Json<SyncUserResponse>, SyncUserError> {
    let identity = identity?;
    let new_user = identity.new_user("Unnamed User", "no-email@example.com");
    let limit = state.config().usage.free_trial_limit;
    let (user, created) = state
        .with_db(move |conn| users::ensure_user(conn, &new_user, limit))
        .await
        .map_err(|e| e.into_api("Failed to sync user"))?;

    Ok(Json(SyncUserResponse {
        success: true,
        user,
        message: (!created).then_some("User already exists"),
    }))
}
