//! Offline summaries bucketed by how much the user said.

use async_trait::async_trait;

use super::{Summarizer, SummaryError};

pub const EMPTY_SUMMARY: &str = "No conversation data available.";

/// Summary text for a given number of words spoken by the user.
pub fn summary_for_word_count(words: usize) -> &'static str {
    match words {
        0..=9 => "Brief session with minimal conversation.",
        10..=49 => "Short conversation covering initial thoughts and feelings.",
        50..=149 => "Moderate conversation exploring key concerns and emotions.",
        _ => "Detailed session discussing various aspects of emotional wellbeing and personal challenges.",
    }
}

/// Summarize a conversation by how much the user said in it.
///
/// A conversation with no messages at all gets [`EMPTY_SUMMARY`]; one where
/// only the assistant spoke falls in the smallest bucket.
pub fn summarize_conversation<'a>(
    has_messages: bool,
    utterances: impl IntoIterator<Item = &'a str>,
) -> &'static str {
    if !has_messages {
        return EMPTY_SUMMARY;
    }
    let words: usize = utterances
        .into_iter()
        .map(|text| text.split_whitespace().count())
        .sum();
    summary_for_word_count(words)
}

/// Pull the user's lines out of `speaker: text` notes.
pub fn user_lines(notes: &str) -> impl Iterator<Item = &str> {
    notes
        .lines()
        .filter_map(|line| line.strip_prefix("user:"))
        .map(str::trim)
}

/// [`Summarizer`] backed by [`summarize_conversation`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSummarizer;

#[async_trait]
impl Summarizer for LocalSummarizer {
    async fn summarize(&self, notes: &str) -> Result<String, SummaryError> {
        let has_messages = notes.lines().any(|line| !line.trim().is_empty());
        Ok(summarize_conversation(has_messages, user_lines(notes)).to_string())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_word_count() {
        assert_eq!(summary_for_word_count(0), "Brief session with minimal conversation.");
        assert_eq!(summary_for_word_count(9), "Brief session with minimal conversation.");
        assert!(summary_for_word_count(10).starts_with("Short"));
        assert!(summary_for_word_count(49).starts_with("Short"));
        assert!(summary_for_word_count(50).starts_with("Moderate"));
        assert!(summary_for_word_count(149).starts_with("Moderate"));
        assert!(summary_for_word_count(150).starts_with("Detailed"));
    }

    #[test]
    fn empty_conversation_means_no_data() {
        assert_eq!(summarize_conversation(false, Vec::<&str>::new()), EMPTY_SUMMARY);
    }

    #[test]
    fn assistant_only_conversation_is_brief() {
        assert_eq!(
            summarize_conversation(true, Vec::<&str>::new()),
            "Brief session with minimal conversation."
        );
    }

    #[test]
    fn only_user_lines_count() {
        let assistant_words = "word ".repeat(200);
        let notes = format!("user: hello there\nai: {assistant_words}\nuser: I feel okay today");
        let lines: Vec<&str> = user_lines(&notes).collect();
        assert_eq!(lines, vec!["hello there", "I feel okay today"]);
        assert_eq!(
            summarize_conversation(true, lines),
            "Brief session with minimal conversation."
        );
    }

    #[tokio::test]
    async fn local_summarizer_reads_notes() {
        let notes = format!("user: {}", "feeling ".repeat(60));
        let summary = LocalSummarizer.summarize(&notes).await.unwrap();
        assert!(summary.starts_with("Moderate"));
    }

    #[tokio::test]
    async fn local_summarizer_handles_assistant_only_notes() {
        let summary = LocalSummarizer
            .summarize("ai: Hi, how are you feeling today?")
            .await
            .unwrap();
        assert_eq!(summary, "Brief session with minimal conversation.");

        let empty = LocalSummarizer.summarize("  \n").await.unwrap();
        assert_eq!(empty, EMPTY_SUMMARY);
    }
}
