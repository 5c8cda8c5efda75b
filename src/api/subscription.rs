//! `/api/subscription`: free-trial and premium-call counters.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::error::ApiError;
use super::identity::Identity;
use super::AppState;
use crate::account::types::{UsageAction, UsageSnapshot};
use crate::account::users;

#[derive(Debug, Deserialize)]
pub struct UsageRequest {
    pub action: String,
    pub calls: Option<i64>,
}

/// GET: current counters, creating the user on first sight.
pub async fn get_usage(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<UsageSnapshot>, ApiError> {
    let new_user = identity.new_user("User", "");
    let limit = state.config().usage.free_trial_limit;
    let snapshot = state
        .with_db(move |conn| {
            let (user, _) = users::ensure_user(conn, &new_user, limit)?;
            Ok(UsageSnapshot::from(&user))
        })
        .await
        .map_err(|e| e.into_api("Failed to fetch subscription data"))?;
    Ok(Json(snapshot))
}

/// POST: apply one counter action and return the updated counters.
pub async fn update_usage(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<UsageRequest>, JsonRejection>,
) -> Result<Json<UsageSnapshot>, ApiError> {
    let Json(req) = payload?;
    let action = UsageAction::parse(&req.action, req.calls).map_err(ApiError::BadRequest)?;

    tracing::info!(user = %identity.user_id, action = %action, "usage action");

    let new_user = identity.new_user("User", "");
    let limit = state.config().usage.free_trial_limit;
    let snapshot = state
        .with_db(move |conn| {
            users::ensure_user(conn, &new_user, limit)?;
            users::apply_usage_action(conn, &new_user.id, action)
        })
        .await
        .map_err(|e| e.into_api("Failed to update subscription data"))?;
    Ok(Json(snapshot))
}
