//! Gemini Chat - conversational service with a saved-chat sidebar
//!
//! Forwards user messages to Gemini with the full conversation as context and
//! keeps an in-memory list of past conversations.

mod api;
mod llm;
mod orchestrator;
mod session;

use api::{create_router, AppState};
use llm::LlmConfig;
use orchestrator::SendOptions;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("CHAT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let llm_config = LlmConfig::from_env()?;
    let backend = llm_config.build_service().inspect_err(|e| {
        tracing::error!(error = %e, "Cannot start without a Gemini backend");
    })?;
    tracing::info!(
        model = %backend.model_id(),
        gateway = llm_config.gateway.is_some(),
        "LLM backend initialized"
    );

    let send_options = SendOptions {
        max_tokens: llm_config.max_output_tokens,
    };
    let state = AppState::new(backend, send_options);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Gemini chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
