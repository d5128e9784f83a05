use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Every UI event a visitor can raise, signed in or not. Access control for views is the
/// router's job, not the HTTP layer's: a guest may ask for any view and gets redirected.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe.
        .route("/health", get(|| async { "ok" }))
        // GET /shell
        // Full paint state for the client.
        .route("/shell", get(handlers::get_shell))
        // GET /views
        // Views the current role may open.
        .route("/views", get(handlers::get_views))
        // POST /navigate
        // Nav links, buttons and cards carrying a view id.
        .route("/navigate", post(handlers::navigate))
        // POST /hash
        // The browser's hashchange event.
        .route("/hash", post(handlers::hash_change))
        // POST /boot
        // Page load: route to the current fragment.
        .route("/boot", post(handlers::boot))
        // POST /sidebar/toggle
        .route("/sidebar/toggle", post(handlers::toggle_sidebar))
        // POST /session/sign-in
        // Credential check, then sign-in and redirect to the role's home view.
        .route("/session/sign-in", post(handlers::sign_in))
}
