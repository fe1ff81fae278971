//! Aura server library logic.

pub mod api_chat;
pub mod api_inference;
pub mod config;
pub mod middleware;
pub mod pacing;

use aura_inference::{ChatClient, EmotionClassifier, SpeechSynthesizer};
use aura_session::{SessionConfig, SessionManager};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use middleware::RateLimiter;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Application state shared across all request handlers.
pub struct AppState {
    /// Session and conversation state.
    pub sessions: Arc<SessionManager>,
    /// Chat provider client; `None` when no API key is configured, which
    /// disables the chat endpoint but nothing else.
    pub chat: Option<ChatClient>,
    /// Emotion classification client (degrades to the sentinel label).
    pub emotion: EmotionClassifier,
    /// Speech synthesis client (degrades to `None` payloads).
    pub speech: SpeechSynthesizer,
    /// Rate limiter state.
    pub rate_limiter: RateLimiter,
    /// Per-IP request budget per minute.
    pub requests_per_minute: u32,
    /// Delay between paced reply chunks.
    pub typing_delay: Duration,
}

impl AppState {
    /// Builds the application state from loaded configuration.
    ///
    /// A missing chat credential disables the chat feature only; the
    /// process still starts and every other endpoint works.
    pub fn from_config(config: &config::Config) -> Self {
        let chat = match ChatClient::new(&config.chat) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "chat feature disabled");
                None
            }
        };

        Self {
            sessions: Arc::new(SessionManager::new(SessionConfig {
                timeout_minutes: config.session.timeout_minutes,
                max_message_chars: config.session.max_message_chars,
            })),
            chat,
            emotion: EmotionClassifier::new(&config.inference),
            speech: SpeechSynthesizer::new(&config.inference),
            rate_limiter: RateLimiter::new(),
            requests_per_minute: config.limits.requests_per_minute,
            typing_delay: Duration::from_millis(config.ui.typing_delay_ms),
        }
    }
}

/// Maximum request body size (64 KiB). Chat payloads are small text; this
/// protects against oversized submissions.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Builds a JSON error response: `{"error": message}`.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route(
            "/api/sessions",
            post(api_chat::create_session_handler).get(api_chat::list_sessions_handler),
        )
        .route(
            "/api/sessions/{sessionId}",
            delete(api_chat::delete_session_handler),
        )
        .route(
            "/api/sessions/{sessionId}/messages",
            get(api_chat::get_history_handler).post(api_chat::send_message_handler),
        )
        .route("/api/emotion", post(api_inference::classify_handler))
        .route("/api/speech", post(api_inference::synthesize_handler))
        .route("/api/thought", get(api_inference::thought_handler));

    // Serve client static files if the directory exists.
    // Configured via AURA_CLIENT_DIR env var; defaults to "client/dist".
    let client_dir =
        std::env::var("AURA_CLIENT_DIR").unwrap_or_else(|_| "client/dist".to_string());
    let router = if std::path::Path::new(&client_dir).join("index.html").exists() {
        tracing::info!(path = %client_dir, "serving client static files");
        let index = format!("{}/index.html", client_dir);
        router.fallback_service(ServeDir::new(&client_dir).fallback(ServeFile::new(index)))
    } else {
        tracing::info!(path = %client_dir, "client directory not found, skipping static file serving");
        router
    };

    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::rate_limit_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
