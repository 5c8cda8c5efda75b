#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use echomind::api::identity::{USER_EMAIL_HEADER, USER_ID_HEADER, USER_NAME_HEADER};
use echomind::api::{self, AppState};
use echomind::config::EchoConfig;
use echomind::db;
use echomind::summary::{Summarizer, SummaryError};
use rusqlite::Connection;
use serde_json::Value;
use tower::ServiceExt;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Summarizer returning a canned answer, or an upstream failure when `None`.
pub struct FixedSummarizer(pub Option<&'static str>);

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(&self, _notes: &str) -> Result<String, SummaryError> {
        match self.0 {
            Some(text) => Ok(text.to_string()),
            None => Err(SummaryError::Upstream {
                status: 429,
                message: "quota exceeded".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Router over an in-memory database.
pub fn test_app(summarizer: FixedSummarizer) -> Router {
    test_app_with(summarizer, EchoConfig::default()).0
}

/// Router over an in-memory database with `config`, plus a handle on the
/// shared connection.
pub fn test_app_with(
    summarizer: FixedSummarizer,
    config: EchoConfig,
) -> (Router, Arc<Mutex<Connection>>) {
    let db = Arc::new(Mutex::new(test_db()));
    let state = AppState::new(Arc::clone(&db), Arc::new(summarizer), Arc::new(config));
    (api::router(state), db)
}

/// Request carrying gateway identity headers for `user`.
pub fn authed(method: &str, uri: &str, user: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user)
        .header(USER_EMAIL_HEADER, format!("{user}@example.com"))
        .header(USER_NAME_HEADER, "Test User");
    with_body(builder, body)
}

/// Request without identity headers.
pub fn anonymous(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    with_body(Request::builder().method(method).uri(uri), body)
}

fn with_body(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON response (`Null` for an empty body).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
