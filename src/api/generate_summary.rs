//! `/api/generate-summary`: summarize a transcript without storing it.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::summary::{self, SummaryError};

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

pub async fn generate_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Json(req) = payload?;
    summary::check_notes(&req.notes, state.config().summary.min_notes_chars)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let summarizer = state.summarizer();
    tracing::info!(provider = summarizer.name(), notes_len = req.notes.len(), "generating summary");

    match summarizer.summarize(&req.notes).await {
        Ok(summary) => Ok(Json(SummaryResponse { summary })),
        Err(SummaryError::Upstream { message, .. }) => Err(ApiError::Internal {
            message,
            details: None,
        }),
        Err(SummaryError::TooShort) => {
            Err(ApiError::BadRequest(SummaryError::TooShort.to_string()))
        }
        Err(e) => Err(ApiError::internal("Failed to generate summary", e)),
    }
}
