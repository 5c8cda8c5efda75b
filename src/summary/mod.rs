//! Session summaries.
//!
//! Provides the [`Summarizer`] trait with two implementations: a hosted
//! generative-text model ([`gemini::GeminiSummarizer`]) and a word-count
//! heuristic that needs no network ([`local::LocalSummarizer`]). The provider
//! is chosen from configuration via [`create_summarizer`].

pub mod gemini;
pub mod local;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a [`Summarizer`].
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Transcript is below the minimum length worth summarizing.
    #[error("Conversation too short to summarize")]
    TooShort,

    /// The provider could not be reached, after retries.
    #[error("summary request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("summary provider returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The provider's answer was not the JSON we expected.
    #[error("malformed summary response: {0}")]
    Malformed(String),
}

/// Turns a session transcript into a short summary for the history page.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `notes` (one `speaker: text` line per message).
    async fn summarize(&self, notes: &str) -> Result<String, SummaryError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

/// Reject transcripts that are too short to summarize.
pub fn check_notes(notes: &str, min_chars: usize) -> Result<(), SummaryError> {
    if notes.trim().chars().count() < min_chars {
        return Err(SummaryError::TooShort);
    }
    Ok(())
}

/// Create a summarizer from config.
///
/// `"gemini"` needs an API key; without one the local heuristic is used instead.
pub fn create_summarizer(
    config: &crate::config::SummaryConfig,
) -> anyhow::Result<Box<dyn Summarizer>> {
    match config.provider.as_str() {
        "gemini" => match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                Ok(Box::new(gemini::GeminiSummarizer::new(config, key)?))
            }
            _ => {
                tracing::warn!("no GEMINI_API_KEY configured, falling back to local summaries");
                Ok(Box::new(local::LocalSummarizer))
            }
        },
        "local" => Ok(Box::new(local::LocalSummarizer)),
        other => anyhow::bail!("unknown summary provider: {other}. Supported: gemini, local"),
    }
}
