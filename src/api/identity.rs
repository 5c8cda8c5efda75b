//! Caller identity.
//!
//! Authentication happens upstream; the gateway forwards the verified user as
//! headers. A request without [`USER_ID_HEADER`] is unauthenticated.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use crate::account::types::NewUser;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    /// Row to insert for this caller, with fallbacks for missing profile fields.
    pub fn new_user(&self, name_fallback: &str, email_fallback: &str) -> NewUser {
        NewUser {
            id: self.user_id.clone(),
            name: self.name.clone().unwrap_or_else(|| name_fallback.to_string()),
            email: self.email.clone().unwrap_or_else(|| email_fallback.to_string()),
        }
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(user_id) = header_value(parts, USER_ID_HEADER) else {
            return Err(ApiError::Unauthorized("Unauthorized".into()));
        };
        Ok(Self {
            user_id,
            email: header_value(parts, USER_EMAIL_HEADER),
            name: header_value(parts, USER_NAME_HEADER),
        })
    }
}
