//! Transcript accumulation for a live voice call.
//!
//! The voice provider streams partial transcripts; a live message is rewritten
//! in place until its final version arrives.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who said a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Ai,
}

impl Speaker {
    /// Provider role `assistant` is the AI; every other role is the user.
    pub fn from_role(role: &str) -> Self {
        if role == "assistant" {
            Self::Ai
        } else {
            Self::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Speaker,
    pub timestamp: DateTime<Utc>,
    /// Still receiving partial transcripts.
    pub is_live: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Fold one transcript event into the conversation.
    ///
    /// If the last message is from the same speaker and still live, its text
    /// is replaced; otherwise a new message is appended.
    pub fn apply(&mut self, sender: Speaker, text: &str, is_final: bool) {
        if let Some(last) = self.messages.last_mut() {
            if last.sender == sender && last.is_live {
                last.text = text.to_string();
                last.is_live = !is_final;
                return;
            }
        }

        let now = Utc::now();
        self.messages.push(Message {
            id: format!("{sender}-{}-{}", now.timestamp_millis(), self.messages.len()),
            text: text.to_string(),
            sender,
            timestamp: now,
            is_live: !is_final,
        });
    }

    /// Everything the user said, in order.
    pub fn user_utterances(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.sender == Speaker::User)
            .map(|m| m.text.as_str())
    }

    /// `speaker: text` per line, the stored form of a session's notes.
    pub fn notes(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.sender, m.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `HH:MM:SS`, as stored in session records.
pub fn format_duration(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hrs:02}:{mins:02}:{secs:02}")
}

/// `MM:SS`, the running clock shown during a call.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
