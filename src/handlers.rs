use crate::{
    AppState,
    auth::SignedIn,
    hash::route_from_fragment,
    models::{
        HashChangeRequest, NavigateRequest, NavigationReport, ShellSnapshot, SignInRequest,
        UserRecord, ViewSummary,
    },
    registry::LANDING_VIEW,
    router::{Navigated, RouteOptions, RouteRequest},
    shell::{DashboardShell, ShellError},
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// SidebarToggleResponse
///
/// Result of POST /sidebar/toggle. `collapsed` is absent when the sidebar is locked.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SidebarToggleResponse {
    pub toggled: bool,
    pub collapsed: Option<bool>,
}

// --- Handlers ---

/// get_shell
///
/// [Public Route] Snapshot of everything the client paints: session, active view,
/// nav highlight and visibility, fragment, badge, sidebar and the visible toast.
#[utoipa::path(
    get,
    path = "/shell",
    responses((status = 200, description = "Shell state", body = ShellSnapshot))
)]
pub async fn get_shell(State(state): State<AppState>) -> Json<ShellSnapshot> {
    let shell = state.shell.lock().await;
    Json(shell.snapshot(Utc::now()))
}

/// get_views
///
/// [Public Route] The registered views the current role may open.
#[utoipa::path(
    get,
    path = "/views",
    responses((status = 200, description = "Views for the current role", body = [ViewSummary]))
)]
pub async fn get_views(State(state): State<AppState>) -> Json<Vec<ViewSummary>> {
    let shell = state.shell.lock().await;
    let role = shell.session().role;
    let views = shell
        .router()
        .registry()
        .visible_to(role)
        .map(|view| view.summary())
        .collect();
    Json(views)
}

/// navigate
///
/// [Public Route] A click on anything carrying a view id. Denials and unknown ids are
/// reported in the body with `ok = false`; they are outcomes, not request errors.
#[utoipa::path(
    post,
    path = "/navigate",
    request_body = NavigateRequest,
    responses((status = 200, description = "Navigation outcome", body = NavigationReport))
)]
pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Json<NavigationReport> {
    let defaults = RouteOptions::default();
    let options = RouteOptions {
        update_hash: payload.update_hash.unwrap_or(defaults.update_hash),
        scroll: payload.scroll.unwrap_or(defaults.scroll),
    };

    let mut shell = state.shell.lock().await;
    let marker = shell.toast_marker();
    let outcome = shell.navigate(RouteRequest::new(&payload.view).with_options(options));
    Json(shell.report(&payload.view, &outcome, marker))
}

/// hash_change
///
/// [Public Route] The browser's `hashchange` event: the address bar now shows `fragment`.
#[utoipa::path(
    post,
    path = "/hash",
    request_body = HashChangeRequest,
    responses((status = 200, description = "Navigation outcome", body = NavigationReport))
)]
pub async fn hash_change(
    State(state): State<AppState>,
    Json(payload): Json<HashChangeRequest>,
) -> Json<NavigationReport> {
    let mut shell = state.shell.lock().await;
    let marker = shell.toast_marker();
    let outcome = shell.fragment_changed(&payload.fragment);
    let requested = route_from_fragment(&payload.fragment).to_string();
    Json(shell.report(&requested, &outcome, marker))
}

/// boot
///
/// [Public Route] The page-load pass: routes to whatever the current fragment names.
#[utoipa::path(
    post,
    path = "/boot",
    responses((status = 200, description = "Navigation outcome", body = NavigationReport))
)]
pub async fn boot(State(state): State<AppState>) -> Json<NavigationReport> {
    let mut shell = state.shell.lock().await;
    let marker = shell.toast_marker();
    let requested = route_from_fragment(&shell.fragment()).to_string();
    let outcome = shell.boot();
    Json(shell.report(&requested, &outcome, marker))
}

/// toggle_sidebar
///
/// [Public Route] Collapse/expand the sidebar. Guests get a toast instead.
#[utoipa::path(
    post,
    path = "/sidebar/toggle",
    responses((status = 200, description = "Sidebar state", body = SidebarToggleResponse))
)]
pub async fn toggle_sidebar(State(state): State<AppState>) -> Json<SidebarToggleResponse> {
    let mut shell = state.shell.lock().await;
    let collapsed = shell.toggle_sidebar();
    Json(SidebarToggleResponse {
        toggled: collapsed.is_some(),
        collapsed,
    })
}

/// sign_in
///
/// [Public Route] Checks credentials with the user store, then signs the session in and
/// lands on the role's home view.
///
/// *Rejection*: 401 Unauthorized with the matching toast; the session is left as it was.
#[utoipa::path(
    post,
    path = "/session/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = NavigationReport),
        (status = 401, description = "Invalid credentials or an account that cannot sign in")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<NavigationReport>, StatusCode> {
    // Credential comparison runs before the shell lock is taken.
    let verdict = state
        .users
        .authenticate(payload.portal, &payload.email, &payload.password)
        .await;

    let mut shell = state.shell.lock().await;
    match verdict {
        Ok(user) => signed_in_report(&mut shell, user).map(Json),
        Err(error) => {
            shell.reject_sign_in(&error);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

fn signed_in_report(
    shell: &mut DashboardShell,
    user: UserRecord,
) -> Result<NavigationReport, StatusCode> {
    let marker = shell.toast_marker();
    let home = shell
        .router()
        .registry()
        .home_route_for(user.role)
        .to_string();
    let outcome = shell.sign_in(user);
    session_change_report(shell, &home, outcome, marker)
}

/// session_change_report
///
/// A refused session change is 401 Unauthorized. Otherwise the session moved and the
/// navigation that followed is reported like any other.
fn session_change_report(
    shell: &DashboardShell,
    requested: &str,
    outcome: Result<Navigated, ShellError>,
    marker: Option<Uuid>,
) -> Result<NavigationReport, StatusCode> {
    let outcome = match outcome {
        Ok(navigated) => Ok(navigated),
        Err(ShellError::Navigation(error)) => Err(error),
        Err(ShellError::Session(error)) => {
            tracing::warn!(%error, "Session change refused");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };
    Ok(shell.report(requested, &outcome, marker))
}

/// sign_out
///
/// [Session Route] Resets to the guest session and shows the landing view.
/// Requires a signed-in session (see `SignedIn`); the session is checked again under
/// the shell lock, so a concurrent second sign-out is also rejected with 401.
#[utoipa::path(
    post,
    path = "/session/sign-out",
    responses(
        (status = 200, description = "Signed out", body = NavigationReport),
        (status = 401, description = "No session")
    )
)]
pub async fn sign_out(
    SignedIn { user }: SignedIn,
    State(state): State<AppState>,
) -> Result<Json<NavigationReport>, StatusCode> {
    tracing::debug!(email = %user.email, "Sign-out requested");
    let mut shell = state.shell.lock().await;
    let marker = shell.toast_marker();
    let outcome = shell.sign_out();
    session_change_report(&shell, LANDING_VIEW, outcome, marker).map(Json)
}
