//! Conversation titles derived from message content

use super::turn::{Role, Turn};

/// Title of a conversation nobody has named yet
pub const NEW_CHAT_TITLE: &str = "New Chat";

const MAX_TITLE_CHARS: usize = 50;

/// Title for a conversation that starts with `content`.
///
/// Keeps the first 50 characters verbatim. Empty content yields
/// [`NEW_CHAT_TITLE`].
pub fn derive_title(content: &str) -> String {
    if content.is_empty() {
        return NEW_CHAT_TITLE.to_string();
    }
    content.chars().take(MAX_TITLE_CHARS).collect()
}

/// Title for a whole transcript: derived from its first user turn
pub(crate) fn title_for_transcript(transcript: &[Turn]) -> String {
    transcript
        .iter()
        .find(|t| t.role == Role::User)
        .map_or_else(|| NEW_CHAT_TITLE.to_string(), |t| derive_title(&t.content))
}
