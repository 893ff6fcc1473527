//! HTTP wiring: chat endpoint, health, middleware stack.
//!
//! The identity binder runs as middleware around every route, so the
//! whole of a request's processing — handler, agent loop, tool calls —
//! happens inside that request's context scope. The chat endpoint is
//! tool-backed and therefore requires a binding up front; everything
//! else proceeds unauthenticated.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::auth::bind_identity;
use crate::context;
use crate::error::AgentError;
use crate::resource::{self, SalesDirectory};
use crate::runtime::AgentRuntime;

#[derive(Clone)]
struct AppState {
    runtime: Arc<AgentRuntime>,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

/// Builds the application router.
///
/// When `mock_directory` is given, the mock protected resource is
/// nested under `/mock` — the prototype layout where agent and
/// downstream run in one process but only talk over HTTP.
pub fn app(runtime: Arc<AgentRuntime>, mock_directory: Option<Arc<SalesDirectory>>) -> Router {
    let mut router = Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .with_state(AppState { runtime });

    if let Some(directory) = mock_directory {
        router = router.nest("/mock", resource::router(directory));
    }

    router
        .layer(middleware::from_fn(bind_identity))
        .layer(TraceLayer::new_for_http())
}

/// Binds the listener and serves until ctrl-c.
pub async fn serve(addr: &str, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received, exiting");
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Chat endpoint.
///
/// Tool-backed, so a missing binding is refused explicitly before the
/// runtime — and with it the tool executor — is ever invoked.
async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    if context::current().is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "authentication required"})),
        )
            .into_response();
    }

    match state.runtime.handle_message(&request.message).await {
        Ok(text) => Json(json!({"response": text})).into_response(),
        Err(e @ AgentError::StepLimitExceeded { .. }) => {
            error!("Chat request failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
        Err(AgentError::Engine(e)) => {
            error!("Decision engine failure: {e:#}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "decision engine unavailable"})),
            )
                .into_response()
        }
    }
}
