//! The conversation store: active transcript plus saved history
//!
//! The active transcript is its own value. `active` points at the history
//! entry backing it, so sync-back never relies on "the last entry".

use super::title::{derive_title, title_for_transcript, NEW_CHAT_TITLE};
use super::turn::{ConversationEntry, Role, Transcript, Turn};
use serde::Serialize;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No conversation at index {index} (history has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Session state for one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationStore {
    transcript: Transcript,
    history: Vec<ConversationEntry>,
    active: Option<usize>,
}

/// One row of the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    /// Position in history, for load/rename/delete
    pub index: usize,
    pub title: String,
    pub turn_count: usize,
    pub is_active: bool,
    /// Newest entry, still an untitled empty placeholder
    pub is_new: bool,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transcript currently displayed
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn history(&self) -> &[ConversationEntry] {
        &self.history
    }

    /// Index of the history entry backing the active transcript
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.history.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.history.len(),
            })
        }
    }

    /// Whether the active transcript is already stored in the entry backing it
    fn is_transcript_saved(&self) -> bool {
        self.active
            .or_else(|| self.history.len().checked_sub(1))
            .and_then(|i| self.history.get(i))
            .is_some_and(|entry| entry.transcript == self.transcript)
    }

    /// Start a fresh conversation.
    ///
    /// An unsaved active transcript is saved first. A new "New Chat"
    /// placeholder becomes the active entry and the transcript is emptied.
    pub fn new_chat(&mut self) {
        if !self.transcript.is_empty() && !self.is_transcript_saved() {
            let title = title_for_transcript(&self.transcript);
            tracing::debug!(%title, "Saving unsaved transcript before new chat");
            self.history
                .push(ConversationEntry::new(title, self.transcript.clone()));
        }

        self.history
            .push(ConversationEntry::new(NEW_CHAT_TITLE, Transcript::new()));
        self.active = Some(self.history.len() - 1);
        self.transcript.clear();

        tracing::debug!(history_len = self.history.len(), "New chat");
    }

    /// Make `history[index]` the active conversation. History is untouched.
    pub fn load_chat(&mut self, index: usize) -> Result<(), StoreError> {
        self.check_index(index)?;
        self.transcript = self.history[index].transcript.clone();
        self.active = Some(index);

        tracing::debug!(index, turns = self.transcript.len(), "Loaded chat");
        Ok(())
    }

    /// Set the title of `history[index]`. Any string is accepted as-is.
    pub fn rename_chat(
        &mut self,
        index: usize,
        title: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.check_index(index)?;
        let title = title.into();
        tracing::debug!(index, %title, "Renamed chat");
        self.history[index].title = title;
        Ok(())
    }

    /// Remove `history[index]`, returning it.
    ///
    /// Deleting the active entry empties the active transcript.
    pub fn delete_chat(&mut self, index: usize) -> Result<ConversationEntry, StoreError> {
        self.check_index(index)?;
        let removed = self.history.remove(index);

        match self.active {
            Some(active) if active == index => {
                self.active = None;
                self.transcript.clear();
            }
            Some(active) if active > index => self.active = Some(active - 1),
            _ => {}
        }
        if self.history.is_empty() {
            self.active = None;
            self.transcript.clear();
        }

        tracing::debug!(index, history_len = self.history.len(), "Deleted chat");
        Ok(removed)
    }

    /// Drop every conversation, including the active one
    pub fn clear_all(&mut self) {
        self.history.clear();
        self.transcript.clear();
        self.active = None;
        tracing::debug!("Cleared all chats");
    }

    /// Append a turn to the active transcript and sync it back into history
    pub fn append_turn(&mut self, turn: Turn) {
        let names_chat = turn.role == Role::User && !turn.content.is_empty();
        let title = names_chat.then(|| derive_title(&turn.content));

        self.transcript.push(turn);
        let index = self.sync_back();

        if let Some(title) = title {
            let entry = &mut self.history[index];
            if entry.title == NEW_CHAT_TITLE {
                entry.title = title;
            }
        }
    }

    /// Copy the active transcript into its history entry, creating one if no
    /// entry is active. Returns the entry's index.
    fn sync_back(&mut self) -> usize {
        if let Some(index) = self.active {
            assert!(
                index < self.history.len(),
                "active index {index} out of range for history of {}",
                self.history.len()
            );
            self.history[index].transcript = self.transcript.clone();
            index
        } else {
            self.history
                .push(ConversationEntry::new(NEW_CHAT_TITLE, self.transcript.clone()));
            let index = self.history.len() - 1;
            self.active = Some(index);
            index
        }
    }

    /// History as the sidebar lists it: newest first
    pub fn sidebar(&self) -> Vec<SidebarItem> {
        let last = self.history.len().checked_sub(1);
        self.history
            .iter()
            .enumerate()
            .rev()
            .map(|(index, entry)| SidebarItem {
                index,
                title: if entry.title.is_empty() {
                    NEW_CHAT_TITLE.to_string()
                } else {
                    entry.title.clone()
                },
                turn_count: entry.transcript.len(),
                is_active: self.active == Some(index),
                is_new: Some(index) == last
                    && entry.title == NEW_CHAT_TITLE
                    && entry.transcript.is_empty(),
            })
            .collect()
    }

    /// Panics if the active transcript and history have drifted apart
    pub fn check_invariants(&self) {
        if let Some(index) = self.active {
            assert!(
                index < self.history.len(),
                "active index {index} out of range for history of {}",
                self.history.len()
            );
            assert_eq!(
                self.history[index].transcript, self.transcript,
                "active entry {index} is out of sync with the active transcript"
            );
        } else {
            assert!(
                self.transcript.is_empty(),
                "non-empty transcript without an active entry"
            );
        }
    }
}
