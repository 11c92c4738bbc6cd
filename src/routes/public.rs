use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session: the article listing, single articles and the
/// login/logout flow. Every path-supplied id is sanitized inside the handler before it
/// reaches the record store.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // All readable articles, newest first.
        .route("/", get(handlers::home))
        // GET /article/{id}
        // One article. 400 for a malformed id, 404 for a missing record.
        .route("/article/{id}", get(handlers::show_article))
        // GET/POST /login
        // The login form and its submission. Success rotates the session id.
        .route("/login", get(handlers::login_form).post(handlers::login))
        // GET /logout
        // Destroys the session and returns to the login form.
        .route("/logout", get(handlers::logout))
}
