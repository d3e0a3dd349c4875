//! Store mutations as replayable values

use super::store::{ConversationStore, StoreError};
use super::turn::Turn;
use serde::{Deserialize, Serialize};

/// Everything that can change a [`ConversationStore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    NewChat,
    LoadChat { index: usize },
    RenameChat { index: usize, title: String },
    DeleteChat { index: usize },
    ClearAll,
    AppendTurn { turn: Turn },
}

impl ConversationStore {
    /// Apply one event
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), StoreError> {
        match event {
            SessionEvent::NewChat => self.new_chat(),
            SessionEvent::LoadChat { index } => self.load_chat(index)?,
            SessionEvent::RenameChat { index, title } => self.rename_chat(index, title)?,
            SessionEvent::DeleteChat { index } => {
                self.delete_chat(index)?;
            }
            SessionEvent::ClearAll => self.clear_all(),
            SessionEvent::AppendTurn { turn } => self.append_turn(turn),
        }

        if cfg!(debug_assertions) {
            self.check_invariants();
        }
        Ok(())
    }

    /// Rebuild a store from the empty state.
    ///
    /// Rejected events leave the store unchanged and are skipped, exactly as
    /// they would be when applied live.
    #[allow(dead_code)] // Used by property tests and session debugging
    pub fn replay(events: impl IntoIterator<Item = SessionEvent>) -> Self {
        let mut store = Self::new();
        for event in events {
            if let Err(e) = store.apply(event) {
                tracing::debug!(error = %e, "Skipping rejected event during replay");
            }
        }
        store
    }
}
