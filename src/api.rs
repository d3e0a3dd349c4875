//! HTTP API: the host that turns UI gestures into store operations

mod handlers;
mod types;

pub use handlers::create_router;

use crate::llm::LlmService;
use crate::orchestrator::SendOptions;
use crate::session::ConversationStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared across handlers.
///
/// Every handler holds the store lock for its whole event, backend call
/// included, so UI events are processed strictly one at a time.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ConversationStore>>,
    pub backend: Arc<dyn LlmService>,
    pub send_options: SendOptions,
}

impl AppState {
    pub fn new(backend: Arc<dyn LlmService>, send_options: SendOptions) -> Self {
        Self {
            store: Arc::new(Mutex::new(ConversationStore::new())),
            backend,
            send_options,
        }
    }
}
