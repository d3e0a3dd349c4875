//! Conversation session state
//!
//! One active transcript plus the saved-conversation history, and the rules
//! that keep the two consistent.

pub mod event;
mod store;
mod title;
mod turn;

#[cfg(test)]
mod proptests;

pub use event::SessionEvent;
pub use store::{ConversationStore, SidebarItem, StoreError};
pub use turn::{ConversationEntry, Turn};
