//! HTTP gateway.
//!
//! Serves:
//! - `GET  /`                             : service banner
//! - `GET  /health`                       : liveness probe
//! - `GET  /api/assistant/info`           : assistant availability
//! - `POST /api/assistant/chat`           : chat with the assistant
//! - `POST /api/assistant/suggest-project` : project suggestions
//! - `POST /api/contact`                  : contact-form submission

mod handlers;

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use crate::assistant::Assistant;
use crate::contact::{ContactNotifier, LogNotifier};

/// Name reported by the banner and health endpoints.
pub const SERVICE_NAME: &str = "Portfolio AI Assistant API";

// ---------------------------------------------------------------------------
// Gateway handle
// ---------------------------------------------------------------------------

/// Handle returned by [`start_gateway`].
pub struct Gateway {
    /// Server task handle.
    pub handle: JoinHandle<()>,
    /// The address the server is actually listening on.
    pub addr: SocketAddr,
}

// ---------------------------------------------------------------------------
// Shared state injected into axum handlers
// ---------------------------------------------------------------------------

/// State shared by every handler.
///
/// `assistant` is `None` when it could not be constructed at startup
/// (missing credential); the AI endpoints then answer 503.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Option<Arc<Assistant>>,
    pub notifier: Arc<dyn ContactNotifier>,
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(assistant: Option<Assistant>) -> Self {
        Self {
            assistant: assistant.map(Arc::new),
            notifier: Arc::new(LogNotifier),
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ContactNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }
}

/// JSON error body `{"detail": ...}` with the given status.
pub(crate) fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "detail": message.into() }))).into_response()
}

/// A request body that failed to decode, as a `422 {"detail": ...}`.
pub(crate) fn invalid_body(rejection: JsonRejection) -> Response {
    warn!(error = %rejection.body_text(), "rejected request body");
    detail(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentials forbid wildcard methods/headers, so mirror the request.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the full router for `state`.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    let api_router = Router::new()
        .route("/assistant/info", get(handlers::assistant::api_assistant_info))
        .route("/assistant/chat", post(handlers::assistant::api_assistant_chat))
        .route(
            "/assistant/suggest-project",
            post(handlers::assistant::api_suggest_project),
        )
        .route("/contact", post(handlers::contact::api_contact_submit));

    Router::new()
        .route("/", get(handlers::health::root_handler))
        .route("/health", get(handlers::health::health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(cors)
}

// ---------------------------------------------------------------------------
// Server startup
// ---------------------------------------------------------------------------

/// Start the HTTP server on `addr`.
///
/// Returns a [`Gateway`] holding the server task handle and bound address.
pub async fn start_gateway(addr: SocketAddr, state: AppState) -> std::io::Result<Gateway> {
    let available = state.assistant.is_some();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("gateway server error: {e}");
        }
    });

    info!(%bound_addr, assistant_available = available, "gateway started");

    Ok(Gateway {
        handle,
        addr: bound_addr,
    })
}
