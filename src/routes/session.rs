use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Session Router Module
///
/// Routes that only make sense while a user is signed in. The `SignedIn` gate applied in
/// `create_router` rejects guest sessions with 401 before any handler runs.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        // POST /session/sign-out
        // Back to the guest session and the landing view.
        .route("/session/sign-out", post(handlers::sign_out))
}
