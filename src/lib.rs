use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Navigation engine.
pub mod access;
pub mod hash;
pub mod registry;
pub mod router;
pub mod session;

// Collaborators and composition.
pub mod notify;
pub mod observers;
pub mod shell;
pub mod users;

// HTTP surface.
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;

use auth::SignedIn;
use routes::{public, session as session_scope};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use registry::ViewRegistry;
pub use router::{NavigationError, Navigated, RouteOptions, RouteRequest, ViewRouter};
pub use shell::{DashboardShell, SharedShell};
pub use users::{MockUserStore, UserStoreState};

/// ApiDoc
///
/// OpenAPI document for the shell's HTTP surface, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_shell, handlers::get_views, handlers::navigate, handlers::hash_change,
        handlers::boot, handlers::toggle_sidebar, handlers::sign_in, handlers::sign_out
    ),
    components(
        schemas(
            models::Role, models::UserRecord, models::Session, models::LoginPortal,
            models::NavigateRequest, models::HashChangeRequest, models::SignInRequest,
            models::Toast, models::NavigationReport, models::ViewSummary, models::ShellSnapshot,
            handlers::SidebarToggleResponse,
        )
    ),
    tags(
        (name = "hunt-portal", description = "Role-aware dashboard shell")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared by every request. The shell sits behind one lock so that navigation and
/// session changes are serialized; the credential store is immutable.
#[derive(Clone)]
pub struct AppState {
    /// The dashboard shell (session, router, address bar, collaborators).
    pub shell: SharedShell,
    /// Credential store consulted on sign-in.
    pub users: UserStoreState,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SharedShell {
    fn from_ref(app_state: &AppState) -> SharedShell {
        app_state.shell.clone()
    }
}

impl FromRef<AppState> for UserStoreState {
    fn from_ref(app_state: &AppState) -> UserStoreState {
        app_state.users.clone()
    }
}

/// session_middleware
///
/// Gate for session-bound routes. `SignedIn` rejects a guest session with
/// 401 Unauthorized before the handler is reached.
async fn session_middleware(_signed_in: SignedIn, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the HTTP surface, its middleware stack and the shared state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            session_scope::session_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            )),
        )
        .with_state(state);

    // Request correlation and tracing, outermost first.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above.
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
