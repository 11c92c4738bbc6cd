use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identifier;
pub mod models;
pub mod repository;
pub mod session;
pub mod views;

// Module for routing segregation (Public, Admin).
pub mod routes;
use auth::AdminSession;
use routes::{admin, public};

// --- Public Re-exports ---

pub use auth::{AdminCredentials, AuthGate, AuthGateState};
pub use config::AppConfig;
pub use repository::{FileRepository, MemoryRepository, RepositoryState};
pub use session::{CookieSettings, MemorySessionStore, SessionState};

/// AppState
///
/// The single, cloneable container holding every service a handler may need. Shared
/// across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Record Store: all article persistence goes through this trait object.
    pub repo: RepositoryState,
    /// Server-side session storage, read by the `Session` extractor.
    pub sessions: SessionState,
    /// Credential check and session transitions.
    pub auth: AuthGateState,
    /// Session cookie attributes.
    pub cookies: CookieSettings,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires the auth gate to `sessions` using the credentials and cookie policy in `config`.
    pub fn new(repo: RepositoryState, sessions: SessionState, config: AppConfig) -> Self {
        let auth = Arc::new(AuthGate::new(config.admin.clone(), sessions.clone()));
        Self {
            repo,
            cookies: CookieSettings::from_config(&config),
            sessions,
            auth,
            config,
        }
    }

    /// An in-memory state for tests: `MemoryRepository`, a fresh session store and
    /// `AppConfig::default()`.
    pub fn in_memory(repo: Arc<MemoryRepository>) -> Self {
        let config = AppConfig::default();
        let sessions = Arc::new(MemorySessionStore::new(config.session_ttl_secs)) as SessionState;
        Self::new(repo, sessions, config)
    }
}

// --- Axum FromRef Extractor Implementations ---

// These let handlers and extractors pull single components out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

/// require_admin
///
/// Route layer for the admin router. `AdminSession` rejects anonymous callers with a
/// redirect to `/login`, so the wrapped handler never runs for them.
async fn require_admin(_admin: AdminSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies the admin guard and the observability
/// layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Public Routes: no guard.
        .merge(public::public_routes())
        // Admin Routes: nested under '/admin' and guarded as a whole.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin,
            )),
        )
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            // Generates a UUID `x-request-id` for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // Wraps each request/response in a span carrying the request id.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // Echoes the request id back to the client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Builds the per-request tracing span from the method, URI and `x-request-id` header,
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
