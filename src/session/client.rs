//! Seams between the session controller and the outside world.
//!
//! [`VoiceClient`] wraps the third-party voice SDK; [`SessionBackend`] is the
//! controller's view of this service. [`HttpSessionBackend`] implements the
//! latter over the REST routes.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::account::types::{UsageAction, UsageSnapshot};
use crate::api::identity::{Identity, USER_EMAIL_HEADER, USER_ID_HEADER, USER_NAME_HEADER};

/// Start and stop calls on the voice provider. Events come back through the
/// controller's channel, not through this trait.
pub trait VoiceClient: Send + Sync {
    fn start(&self, assistant_id: &str) -> Result<()>;
    fn stop(&self) -> Result<()>;
}

/// Body of the session save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpload {
    pub session_id: String,
    pub notes: String,
    pub summary: String,
    pub duration: String,
}

#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Charge one session against the caller's counters.
    async fn record_usage(&self, action: UsageAction) -> Result<UsageSnapshot>;

    /// Ask the service for a model-written summary of `notes`.
    async fn request_summary(&self, notes: &str) -> Result<String>;

    async fn save_session(&self, upload: &SessionUpload) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    summary: String,
}

/// [`SessionBackend`] that talks to the EchoMind REST routes.
pub struct HttpSessionBackend {
    client: reqwest::Client,
    base_url: String,
    identity: Identity,
}

impl HttpSessionBackend {
    pub fn new(base_url: &str, identity: Identity) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header(USER_ID_HEADER, &self.identity.user_id);
        if let Some(email) = &self.identity.email {
            req = req.header(USER_EMAIL_HEADER, email);
        }
        if let Some(name) = &self.identity.name {
            req = req.header(USER_NAME_HEADER, name);
        }
        req
    }

    async fn send(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .post(path)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("{path} returned HTTP {status}: {text}");
        }
        Ok(response)
    }

    /// Current counters, for gating the next session.
    pub async fn fetch_usage(&self) -> Result<UsageSnapshot> {
        let mut req = self
            .client
            .get(format!("{}/api/subscription", self.base_url))
            .header(USER_ID_HEADER, &self.identity.user_id);
        if let Some(email) = &self.identity.email {
            req = req.header(USER_EMAIL_HEADER, email);
        }
        let response = req.send().await.context("request to /api/subscription failed")?;
        anyhow::ensure!(
            response.status().is_success(),
            "/api/subscription returned HTTP {}",
            response.status()
        );
        response
            .json()
            .await
            .context("invalid subscription response")
    }
}

#[async_trait]
impl SessionBackend for HttpSessionBackend {
    async fn record_usage(&self, action: UsageAction) -> Result<UsageSnapshot> {
        let body = match action {
            UsageAction::AddPremiumCalls(calls) => json!({ "action": action.as_str(), "calls": calls }),
            _ => json!({ "action": action.as_str() }),
        };
        let response = self.send("/api/subscription", body).await?;
        response.json().await.context("invalid subscription response")
    }

    async fn request_summary(&self, notes: &str) -> Result<String> {
        let response = self
            .send("/api/generate-summary", json!({ "notes": notes }))
            .await?;
        let body: SummaryBody = response.json().await.context("invalid summary response")?;
        Ok(body.summary)
    }

    async fn save_session(&self, upload: &SessionUpload) -> Result<()> {
        let body = serde_json::to_value(upload)?;
        self.send("/api/history", body).await?;
        Ok(())
    }
}
