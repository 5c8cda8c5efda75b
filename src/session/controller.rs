//! Voice session lifecycle.
//!
//! [`SessionController`] is a small state machine (`Idle → Initializing →
//! Recording → Saving → Idle`) driven by voice-provider events and the user's
//! mic toggle. When a call ends it charges one session against the usage
//! counters, derives a summary, and saves the session exactly once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::client::{SessionBackend, SessionUpload, VoiceClient};
use super::transcript::{format_clock, format_duration, Message, Speaker, Transcript};
use crate::account::types::{UsageDenial, UsageSnapshot};
use crate::summary::{self, local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Initializing,
    Recording,
    Saving,
}

/// Callbacks from the voice provider.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    CallStart,
    CallEnd,
    Transcript {
        role: String,
        text: String,
        is_final: bool,
    },
    Error(String),
}

/// Everything the run loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerInput {
    Voice(VoiceEvent),
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Starting,
    Stopping,
    Denied(UsageDenial),
    StartFailed,
    /// A start or save is already in flight.
    Busy,
}

/// What happened at the end of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { session_id: String },
    /// This call was already saved (or a save was already attempted).
    AlreadySaved,
    /// The call never started, so there is nothing to save.
    NoSession,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub assistant_id: String,
    /// Ask the service for a model-written summary before falling back to the local one.
    pub rich_summary: bool,
    pub min_notes_chars: usize,
}

impl From<&crate::config::EchoConfig> for ControllerOptions {
    fn from(config: &crate::config::EchoConfig) -> Self {
        Self {
            assistant_id: config.session.assistant_id.clone(),
            rich_summary: config.session.rich_summary,
            min_notes_chars: config.summary.min_notes_chars,
        }
    }
}

pub struct SessionController {
    voice: Arc<dyn VoiceClient>,
    backend: Arc<dyn SessionBackend>,
    options: ControllerOptions,
    usage: UsageSnapshot,
    state: SessionState,
    waiting_for_assistant: bool,
    transcript: Transcript,
    session_id: Option<String>,
    elapsed_secs: u64,
    save_attempted: bool,
    summary: Option<String>,
}

impl SessionController {
    pub fn new(
        voice: Arc<dyn VoiceClient>,
        backend: Arc<dyn SessionBackend>,
        options: ControllerOptions,
        usage: UsageSnapshot,
    ) -> Self {
        Self {
            voice,
            backend,
            options,
            usage,
            state: SessionState::Idle,
            waiting_for_assistant: false,
            transcript: Transcript::new(),
            session_id: None,
            elapsed_secs: 0,
            save_attempted: false,
            summary: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn usage(&self) -> &UsageSnapshot {
        &self.usage
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn is_waiting_for_assistant(&self) -> bool {
        self.waiting_for_assistant
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Running clock, `MM:SS`.
    pub fn clock(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    /// Summary of the last finished call.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Replace the usage counters, e.g. after the user buys more calls.
    pub fn set_usage(&mut self, usage: UsageSnapshot) {
        self.usage = usage;
    }

    /// The mic button. Stopping is always allowed; starting is gated on usage.
    pub fn toggle(&mut self) -> ToggleOutcome {
        match self.state {
            SessionState::Recording => {
                self.state = SessionState::Saving;
                if let Err(e) = self.voice.stop() {
                    tracing::error!(error = %e, "failed to stop call");
                }
                ToggleOutcome::Stopping
            }
            SessionState::Initializing | SessionState::Saving => ToggleOutcome::Busy,
            SessionState::Idle => {
                if let Err(denial) = self.usage.check_can_start() {
                    tracing::info!(%denial, "session start denied");
                    return ToggleOutcome::Denied(denial);
                }

                self.state = SessionState::Initializing;
                match self.voice.start(&self.options.assistant_id) {
                    Ok(()) => ToggleOutcome::Starting,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to start call");
                        self.state = SessionState::Idle;
                        ToggleOutcome::StartFailed
                    }
                }
            }
        }
    }

    /// One second of wall time.
    pub fn tick(&mut self) {
        if self.state == SessionState::Recording {
            self.elapsed_secs += 1;
        }
    }

    /// Apply a voice-provider event. Returns the save outcome for `CallEnd`.
    pub async fn handle(&mut self, event: VoiceEvent) -> Option<SaveOutcome> {
        match event {
            VoiceEvent::CallStart => {
                self.on_call_start();
                None
            }
            VoiceEvent::CallEnd => Some(self.on_call_end().await),
            VoiceEvent::Transcript {
                role,
                text,
                is_final,
            } => {
                self.waiting_for_assistant = false;
                self.transcript
                    .apply(Speaker::from_role(&role), &text, is_final);
                None
            }
            VoiceEvent::Error(message) => {
                tracing::error!(%message, state = ?self.state, "voice provider error");
                self.state = SessionState::Idle;
                self.waiting_for_assistant = false;
                None
            }
        }
    }

    fn on_call_start(&mut self) {
        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(session = %session_id, "call started");

        self.session_id = Some(session_id);
        self.state = SessionState::Recording;
        self.waiting_for_assistant = true;
        self.transcript.clear();
        self.elapsed_secs = 0;
        self.save_attempted = false;
        self.summary = None;
    }

    async fn on_call_end(&mut self) -> SaveOutcome {
        self.state = SessionState::Saving;
        self.waiting_for_assistant = false;

        if self.save_attempted {
            self.state = SessionState::Idle;
            return SaveOutcome::AlreadySaved;
        }
        let Some(session_id) = self.session_id.take() else {
            tracing::warn!("call ended without a session");
            self.state = SessionState::Idle;
            return SaveOutcome::NoSession;
        };
        self.save_attempted = true;

        let action = self.usage.consuming_action();
        match self.backend.record_usage(action).await {
            Ok(snapshot) => self.usage = snapshot,
            Err(e) => tracing::error!(error = %e, %action, "failed to record usage"),
        }

        let notes = self.transcript.notes();
        let summary = self.derive_summary(&notes).await;
        self.summary = Some(summary.clone());

        let upload = SessionUpload {
            session_id: session_id.clone(),
            notes,
            summary,
            duration: format_duration(self.elapsed_secs),
        };
        let outcome = match self.backend.save_session(&upload).await {
            Ok(()) => {
                tracing::info!(session = %session_id, duration = %upload.duration, "session saved");
                SaveOutcome::Saved { session_id }
            }
            Err(e) => {
                tracing::error!(session = %session_id, error = %e, "save failed");
                SaveOutcome::Failed(e.to_string())
            }
        };

        self.state = SessionState::Idle;
        outcome
    }

    async fn derive_summary(&self, notes: &str) -> String {
        let local = local::summarize_conversation(
            !self.transcript.is_empty(),
            self.transcript.user_utterances(),
        )
        .to_string();
        if !self.options.rich_summary
            || summary::check_notes(notes, self.options.min_notes_chars).is_err()
        {
            return local;
        }

        match self.backend.request_summary(notes).await {
            Ok(rich) if !rich.trim().is_empty() => rich,
            Ok(_) => local,
            Err(e) => {
                tracing::warn!(error = %e, "rich summary failed, using local summary");
                local
            }
        }
    }

    /// Drive the controller from a channel until every sender is dropped,
    /// ticking the clock once per second.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<ControllerInput>) -> Self {
        let mut clock = tokio::time::interval(Duration::from_secs(1));
        clock.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        clock.tick().await;

        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(ControllerInput::Voice(event)) => {
                        if let Some(outcome) = self.handle(event).await {
                            tracing::debug!(?outcome, "call finished");
                        }
                    }
                    Some(ControllerInput::Toggle) => {
                        let outcome = self.toggle();
                        tracing::debug!(?outcome, "toggle");
                    }
                    None => break,
                },
                _ = clock.tick() => self.tick(),
            }
        }
        self
    }
}
