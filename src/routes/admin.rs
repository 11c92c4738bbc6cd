use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Article management, nested under `/admin`. The whole router is wrapped in the
/// `require_admin` route layer, so an anonymous caller is redirected to `/login` before
/// any path id is parsed or the store is touched. Handlers additionally take an
/// `AdminSession`, which keeps them guarded if mounted elsewhere.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/dashboard
        // Listing with edit and delete controls.
        .route("/dashboard", get(handlers::dashboard))
        // GET/POST /admin/add
        // New article form and its submission. Validation errors re-render the form.
        .route("/add", get(handlers::add_form).post(handlers::add_article))
        // GET/POST /admin/edit/{id}
        // Edit form and its submission. All three fields are replaced.
        .route(
            "/edit/{id}",
            get(handlers::edit_form).post(handlers::edit_article),
        )
        // POST /admin/delete/{id}
        // Permanent removal.
        .route("/delete/{id}", post(handlers::delete_article))
}
