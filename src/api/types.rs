//! API request and response types

use crate::session::{ConversationEntry, ConversationStore, SidebarItem, Turn};
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to rename a conversation
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

/// Everything the UI needs to re-render
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub transcript: Vec<Turn>,
    pub history: Vec<ConversationEntry>,
    pub active_index: Option<usize>,
    pub sidebar: Vec<SidebarItem>,
}

impl From<&ConversationStore> for SessionSnapshot {
    fn from(store: &ConversationStore) -> Self {
        Self {
            transcript: store.transcript().to_vec(),
            history: store.history().to_vec(),
            active_index: store.active_index(),
            sidebar: store.sidebar(),
        }
    }
}

/// Response for chat action
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: Turn,
    pub backend_ok: bool,
    pub session: SessionSnapshot,
}

/// Version information
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub model: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
