//! HTTP request handlers
//!
//! Every mutating endpoint answers with the post-mutation snapshot, which is
//! the UI's cue to re-render.

use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, RenameRequest, SessionSnapshot, VersionResponse,
};
use super::AppState;
use crate::orchestrator::{send_message, SendError};
use crate::session::{SessionEvent, StoreError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/session", get(get_session))
        // Sidebar actions
        .route("/api/chats/new", post(new_chat))
        .route("/api/chats/clear", post(clear_all))
        .route("/api/chats/:index/load", post(load_chat))
        .route("/api/chats/:index/rename", post(rename_chat))
        .route("/api/chats/:index/delete", post(delete_chat))
        // Message submit
        .route("/api/chat", post(send_chat))
        // Generic event dispatch
        .route("/api/events", post(apply_event))
        .route("/version", get(get_version))
        .with_state(state)
}

async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let store = state.store.lock().await;
    Json(SessionSnapshot::from(&*store))
}

/// Apply one store event and return the new snapshot
async fn dispatch(
    state: &AppState,
    event: SessionEvent,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut store = state.store.lock().await;
    store.apply(event)?;
    Ok(Json(SessionSnapshot::from(&*store)))
}

async fn new_chat(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, SessionEvent::NewChat).await
}

async fn clear_all(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, AppError> {
    tracing::info!("Clearing all chat history");
    dispatch(&state, SessionEvent::ClearAll).await
}

async fn load_chat(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, SessionEvent::LoadChat { index }).await
}

async fn rename_chat(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(
        &state,
        SessionEvent::RenameChat {
            index,
            title: req.title,
        },
    )
    .await
}

async fn delete_chat(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, SessionEvent::DeleteChat { index }).await
}

async fn apply_event(
    State(state): State<AppState>,
    Json(event): Json<SessionEvent>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, event).await
}

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let mut store = state.store.lock().await;
    let outcome = send_message(
        &mut store,
        state.backend.as_ref(),
        &req.text,
        state.send_options,
    )
    .await?;

    tracing::info!(
        backend_ok = outcome.backend_ok,
        turns = store.transcript().len(),
        "Chat turn completed"
    );

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        backend_ok: outcome.backend_ok,
        session: SessionSnapshot::from(&*store),
    }))
}

async fn get_version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        model: state.backend.model_id().to_string(),
    })
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::IndexOutOfRange { .. } => AppError::NotFound(e.to_string()),
        }
    }
}

impl From<SendError> for AppError {
    fn from(e: SendError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
