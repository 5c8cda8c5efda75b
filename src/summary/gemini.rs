//! Hosted summaries through the Gemini `generateContent` endpoint.
//!
//! One request per summary. Transport failures are retried with exponential
//! backoff; an HTTP error response is returned to the caller as-is.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Summarizer, SummaryError};
use crate::config::SummaryConfig;

const PROMPT: &str = "\
You are an expert therapist and note-taker.

You will receive the full transcript of a conversation between a client and an AI emotional-wellness assistant.
Your task is to produce a clear, structured, concise summary for the user's history page.

Follow this exact format:

---

## Key Discussion Points
• Summarize the main topics the user talked about.
• Include emotional themes, personal struggles, progress, or concerns.
• Keep the points factual and neutral.
• 3–6 bullet points.

## Recommendations
• Provide actionable, supportive suggestions based on the discussion.
• Focus on emotional wellbeing, mindfulness, stress management, or healthy habits.
• 2–4 bullet points.
• Do NOT give medical or clinical advice.

---

Rules:
- Do NOT include timestamps, quotes, or analysis meta-discussion.
- Do NOT mention that this is an AI summary.
- Do NOT add sections other than the two listed above.
- Keep the entire output concise but meaningful.
- Maintain a compassionate, supportive tone.

Output only the formatted summary.
";

/// The full prompt sent for `notes`.
pub fn build_prompt(notes: &str) -> String {
    format!("{PROMPT}{notes}\n")
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, or empty.
    fn first_text(&self) -> &str {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .unwrap_or("")
    }
}

/// Gemini-backed [`Summarizer`].
pub struct GeminiSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_retries: u32,
    initial_backoff: Duration,
}

impl GeminiSummarizer {
    pub fn new(config: &SummaryConfig, api_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );
        tracing::info!(endpoint = %endpoint, "gemini summarizer ready");

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        })
    }

    /// POST the prompt, retrying transport failures with doubling delays.
    async fn send_with_retry(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, SummaryError> {
        let mut delay = self.initial_backoff;
        let mut attempt = 0;
        loop {
            let result = self
                .client
                .post(&self.endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "summary request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(SummaryError::Transport(e)),
            }
        }
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, notes: &str) -> Result<String, SummaryError> {
        let body = json!({
            "contents": [
                { "parts": [ { "text": build_prompt(notes) } ] }
            ]
        });

        let response = self.send_with_retry(&body).await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").cloned())
                .map(|e| match e.get("message").and_then(|m| m.as_str()) {
                    Some(m) => m.to_string(),
                    None => e.to_string(),
                })
                .unwrap_or_else(|| "Gemini request failed".to_string());
            tracing::error!(status = status.as_u16(), %message, "summary provider error");
            return Err(SummaryError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| SummaryError::Malformed(e.to_string()))?;
        let summary = parsed.first_text().trim().to_string();
        tracing::debug!(summary_len = summary.len(), "summary generated");
        Ok(summary)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
