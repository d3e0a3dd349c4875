//! Turn orchestration: user text in, assistant turn out
//!
//! The full transcript is sent on every call, so the backend holds no session
//! and a failed call can be retried by simply sending again.

use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::session::{ConversationStore, Turn};
use thiserror::Error;

/// Errors rejected before the store is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("Message is empty")]
    EmptyMessage,
}

/// What the backend call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    Success(String),
    Failure(String),
}

/// Result of a send, for the host to re-render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// The assistant turn that was appended
    pub reply: Turn,
    pub backend_ok: bool,
}

/// Options applied to every backend request
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    pub max_tokens: Option<u32>,
}

/// Build the backend request from the active transcript
pub fn build_request(transcript: &[Turn], options: SendOptions) -> LlmRequest {
    LlmRequest::from_messages(transcript.iter().map(Turn::to_llm_message).collect())
        .with_max_tokens(options.max_tokens)
}

/// Human-readable description of a backend failure
fn describe_error(error: &LlmError) -> String {
    format!("Gemini API Error: {}", error.message)
}

/// Text of the assistant turn recorded for a failed call
pub fn error_turn_text(description: &str) -> String {
    format!("❌ {description}. Please try again.")
}

/// Invoke the backend, folding every failure into [`BackendReply::Failure`]
pub async fn call_backend(backend: &dyn LlmService, request: &LlmRequest) -> BackendReply {
    match backend.complete(request).await {
        Ok(response) if response.text.is_empty() => {
            BackendReply::Failure(describe_error(&LlmError::malformed("Empty response")))
        }
        Ok(response) => {
            if !response.end_turn {
                tracing::warn!(
                    model = %backend.model_id(),
                    "Response ended early; reply may be truncated"
                );
            }
            BackendReply::Success(response.text)
        }
        Err(e) => BackendReply::Failure(describe_error(&e)),
    }
}

/// Send one user message and record the reply.
///
/// Backend failures become an assistant turn carrying the error; only an
/// empty message is rejected.
pub async fn send_message(
    store: &mut ConversationStore,
    backend: &dyn LlmService,
    user_text: &str,
    options: SendOptions,
) -> Result<SendOutcome, SendError> {
    if user_text.trim().is_empty() {
        return Err(SendError::EmptyMessage);
    }

    store.append_turn(Turn::user(user_text));
    let request = build_request(store.transcript(), options);

    let (reply, backend_ok) = match call_backend(backend, &request).await {
        BackendReply::Success(text) => (Turn::assistant(text), true),
        BackendReply::Failure(description) => {
            tracing::warn!(error = %description, "Recording backend failure as assistant turn");
            (Turn::assistant(error_turn_text(&description)), false)
        }
    };

    store.append_turn(reply.clone());
    Ok(SendOutcome { reply, backend_ok })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockLlmService;
    use crate::llm::{GeminiService, LlmMessage, LlmResponse, MessageRole};

    #[tokio::test]
    async fn test_send_appends_user_and_reply() {
        let backend = MockLlmService::new("mock");
        backend.queue_text("Hi! How can I help?");
        let mut store = ConversationStore::new();

        let outcome = send_message(&mut store, &backend, "hello world", SendOptions::default())
            .await
            .unwrap();

        assert!(outcome.backend_ok);
        assert_eq!(outcome.reply, Turn::assistant("Hi! How can I help?"));
        assert_eq!(
            store.transcript(),
            &[Turn::user("hello world"), Turn::assistant("Hi! How can I help?")]
        );
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].title, "hello world");
        assert_eq!(store.history()[0].transcript, store.transcript());
    }

    #[tokio::test]
    async fn test_request_carries_full_context_in_order() {
        let backend = MockLlmService::new("mock");
        backend.queue_text("first reply");
        backend.queue_text("second reply");
        let mut store = ConversationStore::new();
        let options = SendOptions {
            max_tokens: Some(64),
        };

        send_message(&mut store, &backend, "one", options).await.unwrap();
        send_message(&mut store, &backend, "two", options).await.unwrap();

        let requests = backend.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].messages, vec![LlmMessage::user("one")]);
        assert_eq!(
            requests[1].messages,
            vec![
                LlmMessage::user("one"),
                LlmMessage::assistant("first reply"),
                LlmMessage::user("two"),
            ]
        );
        assert_eq!(requests[1].max_tokens, Some(64));
        assert_eq!(requests[1].messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_error_turn() {
        let backend = MockLlmService::new("mock");
        backend.queue_error(LlmError::rate_limit("Rate limit exceeded: quota"));
        let mut store = ConversationStore::new();
        store.new_chat();
        let before = store.transcript().len();

        let outcome = send_message(&mut store, &backend, "hello", SendOptions::default())
            .await
            .unwrap();

        assert!(!outcome.backend_ok);
        assert_eq!(store.transcript().len(), before + 2);
        assert_eq!(store.transcript()[0], Turn::user("hello"));
        assert_eq!(
            store.transcript()[1],
            Turn::assistant("❌ Gemini API Error: Rate limit exceeded: quota. Please try again.")
        );
        assert_eq!(store.history()[0].transcript, store.transcript());
        assert_eq!(store.history()[0].title, "hello");
    }

    #[tokio::test]
    async fn test_retry_after_failure_resends_context() {
        let backend = MockLlmService::new("mock");
        backend.queue_error(LlmError::network("Connection failed"));
        backend.queue_text("ok now");
        let mut store = ConversationStore::new();

        send_message(&mut store, &backend, "ping", SendOptions::default())
            .await
            .unwrap();
        send_message(&mut store, &backend, "ping", SendOptions::default())
            .await
            .unwrap();

        assert_eq!(store.transcript().len(), 4);
        assert_eq!(backend.recorded_requests()[1].messages.len(), 3);
        assert_eq!(store.transcript()[3], Turn::assistant("ok now"));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let backend = MockLlmService::new("mock");
        let mut store = ConversationStore::new();

        let err = send_message(&mut store, &backend, "   \n", SendOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, SendError::EmptyMessage);
        assert_eq!(store, ConversationStore::new());
        assert!(backend.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_is_failure() {
        let backend = MockLlmService::new("mock");
        backend.queue_response(LlmResponse::from_text(""));

        let request = build_request(&[Turn::user("hi")], SendOptions::default());
        let reply = call_backend(&backend, &request).await;
        assert_eq!(
            reply,
            BackendReply::Failure("Gemini API Error: Empty response".to_string())
        );
    }

    #[tokio::test]
    async fn test_send_after_new_chat_names_placeholder() {
        let backend = MockLlmService::new("mock");
        backend.queue_text("sure");
        let mut store = ConversationStore::new();
        store.append_turn(Turn::user("older"));
        store.new_chat();
        assert_eq!(store.history()[1].title, "New Chat");

        send_message(&mut store, &backend, "newer topic", SendOptions::default())
            .await
            .unwrap();
        assert_eq!(store.history()[1].title, "newer topic");
        assert_eq!(store.history()[0].transcript, vec![Turn::user("older")]);
    }

    #[tokio::test]
    async fn test_unreachable_backend_error_turn_hides_api_key() {
        let backend = GeminiService::new(
            "SECRET-KEY-123".to_string(),
            "m",
            Some("http://127.0.0.1:1"),
        )
        .unwrap();
        let mut store = ConversationStore::new();

        let outcome = send_message(&mut store, &backend, "hello", SendOptions::default())
            .await
            .unwrap();

        assert!(!outcome.backend_ok);
        assert!(outcome.reply.content.starts_with("❌ Gemini API Error: "));
        for turn in store.transcript().iter().chain(&store.history()[0].transcript) {
            assert!(!turn.content.contains("SECRET-KEY-123"), "{}", turn.content);
        }
    }
}
