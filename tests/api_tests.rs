use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
};
use hunt_portal::{
    AppState, DashboardShell, MockUserStore, ViewRegistry, auth::SignedIn, create_router,
    handlers,
    hash::MemoryAddressBar,
    models::{LoginPortal, NavigationReport, Role, ShellSnapshot, UserRecord, ViewSummary},
    notify::ToastBoard,
    users::{CredentialError, UserStore, UserStoreState},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

// --- Test Setup ---

/// Rejects every credential, whatever the portal.
struct LockedUserStore;

#[async_trait]
impl UserStore for LockedUserStore {
    async fn authenticate(
        &self,
        portal: LoginPortal,
        _email: &str,
        _password: &str,
    ) -> Result<UserRecord, CredentialError> {
        match portal {
            LoginPortal::Student => Err(CredentialError::InvalidStudentCredentials),
            LoginPortal::Admin => Err(CredentialError::InvalidAdminCode),
        }
    }
}

/// Hands back a record with the guest role, which the session must refuse.
struct GuestUserStore;

#[async_trait]
impl UserStore for GuestUserStore {
    async fn authenticate(
        &self,
        _portal: LoginPortal,
        email: &str,
        _password: &str,
    ) -> Result<UserRecord, CredentialError> {
        Ok(UserRecord {
            role: Role::Guest,
            name: "Ghost".to_string(),
            email: email.to_string(),
            team: "None".to_string(),
        })
    }
}

fn state_with(users: UserStoreState, fragment: &str) -> AppState {
    let registry = Arc::new(ViewRegistry::dashboard().unwrap());
    let shell = DashboardShell::new(
        registry,
        Arc::new(MemoryAddressBar::with_fragment(fragment)),
        ToastBoard::default(),
    );
    AppState {
        shell: shell.into_shared(),
        users,
    }
}

fn app_with(users: UserStoreState, fragment: &str) -> Router {
    create_router(state_with(users, fragment))
}

fn app() -> Router {
    app_with(Arc::new(MockUserStore::new()), "")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json<T: DeserializeOwned>(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, T) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn sign_in_as(app: &Router, portal: &str, email: &str, password: &str) -> (StatusCode, Vec<u8>) {
    send(
        app,
        "POST",
        "/session/sign-in",
        Some(json!({ "portal": portal, "email": email, "password": password })),
    )
    .await
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_boot_then_shell_shows_landing_for_guest() {
    let app = app();

    let (status, report): (_, NavigationReport) = send_json(&app, "POST", "/boot", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(report.ok);
    assert_eq!(report.requested, "landing");
    assert_eq!(report.active_view.as_deref(), Some("landing"));
    assert_eq!(report.toast, None);

    let (_, shell): (_, ShellSnapshot) = send_json(&app, "GET", "/shell", None).await;
    assert_eq!(shell.active_view.as_deref(), Some("landing"));
    assert_eq!(shell.fragment, "");
    assert_eq!(shell.badge, "Signed out");
    assert!(shell.sidebar_locked);
    assert!(!shell.session.authenticated);
}

#[tokio::test]
async fn test_boot_honours_existing_fragment() {
    let app = app_with(Arc::new(MockUserStore::new()), "#admin");

    let (_, report): (_, NavigationReport) = send_json(&app, "POST", "/boot", None).await;
    assert!(!report.ok);
    assert_eq!(report.requested, "admin");
    assert_eq!(report.active_view.as_deref(), Some("auth"));
    assert_eq!(report.reason.as_deref(), Some("sign_in_required"));
}

#[tokio::test]
async fn test_guest_navigation_to_restricted_view_is_reported() {
    let app = app();

    let (status, report): (_, NavigationReport) = send_json(
        &app,
        "POST",
        "/navigate",
        Some(json!({ "view": "student-dashboard" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!report.ok);
    assert_eq!(report.active_view.as_deref(), Some("auth"));
    assert_eq!(report.reason.as_deref(), Some("sign_in_required"));
    assert_eq!(
        report.toast.as_deref(),
        Some("Please sign in to access this page.")
    );
}

#[tokio::test]
async fn test_unknown_view_is_reported() {
    let (_, report): (_, NavigationReport) = send_json(
        &app(),
        "POST",
        "/navigate",
        Some(json!({ "view": "settings", "scroll": false })),
    )
    .await;

    assert!(!report.ok);
    assert_eq!(report.active_view, None);
    assert_eq!(report.reason.as_deref(), Some("unknown_view"));
    assert_eq!(report.toast.as_deref(), Some("Page unavailable."));
}

#[tokio::test]
async fn test_views_follow_role() {
    let app = app();

    let (_, views): (_, Vec<ViewSummary>) = send_json(&app, "GET", "/views", None).await;
    let ids: Vec<&str> = views.iter().map(|view| view.id.as_str()).collect();
    assert_eq!(ids, vec!["landing", "auth"]);

    let (status, _) = sign_in_as(&app, "student", "admin@ua.edu", "admin!2024").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = sign_in_as(&app, "admin", "admin@ua.edu", "admin!2024").await;
    assert_eq!(status, StatusCode::OK);

    let (_, views): (_, Vec<ViewSummary>) = send_json(&app, "GET", "/views", None).await;
    let ids: Vec<&str> = views.iter().map(|view| view.id.as_str()).collect();
    assert!(ids.contains(&"admin"));
    assert!(ids.contains(&"admin-profile"));
    assert!(!ids.contains(&"auth"));
    assert!(!ids.contains(&"messages"));
}

#[tokio::test]
async fn test_sign_in_flow_lands_on_home_view() {
    let app = app();

    let (status, bytes) = sign_in_as(&app, "student", "student@ua.edu", "student123").await;
    assert_eq!(status, StatusCode::OK);
    let report: NavigationReport = serde_json::from_slice(&bytes).unwrap();
    assert!(report.ok);
    assert_eq!(report.requested, "student-dashboard");
    assert_eq!(report.active_view.as_deref(), Some("student-dashboard"));
    assert_eq!(report.toast.as_deref(), Some("Welcome back, Jamie Alvarez!"));

    let (_, shell): (_, ShellSnapshot) = send_json(&app, "GET", "/shell", None).await;
    assert!(shell.session.authenticated);
    assert_eq!(shell.fragment, "#student-dashboard");
    assert_eq!(shell.active_nav.as_deref(), Some("student-dashboard"));
    assert_eq!(shell.badge, "Jamie Alvarez · Student");
}

#[tokio::test]
async fn test_rejected_sign_in_keeps_guest_session() {
    let app = app_with(Arc::new(LockedUserStore), "");

    let (status, _) = sign_in_as(&app, "admin", "admin@ua.edu", "admin!2024").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, shell): (_, ShellSnapshot) = send_json(&app, "GET", "/shell", None).await;
    assert!(!shell.session.authenticated);
    assert_eq!(
        shell.toast.map(|toast| toast.message).as_deref(),
        Some("Invalid admin access code.")
    );
}

#[tokio::test]
async fn test_guest_record_from_store_is_not_signed_in() {
    let app = app_with(Arc::new(GuestUserStore), "");

    let (status, _) = sign_in_as(&app, "student", "ghost@ua.edu", "anything").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, shell): (_, ShellSnapshot) = send_json(&app, "GET", "/shell", None).await;
    assert!(!shell.session.authenticated);
    assert_eq!(shell.active_view, None);
    assert_eq!(shell.toast, None);
}

#[tokio::test]
async fn test_sign_out_rechecks_session_under_lock() {
    // A request that passed the gate before another sign-out completed.
    let state = state_with(Arc::new(MockUserStore::new()), "");
    let stale = SignedIn {
        user: UserRecord {
            role: Role::Student,
            name: "Jamie Alvarez".to_string(),
            email: "student@ua.edu".to_string(),
            team: "Team Crimson".to_string(),
        },
    };

    let result = handlers::sign_out(stale, State(state.clone())).await;

    assert_eq!(result.err(), Some(StatusCode::UNAUTHORIZED));
    let shell = state.shell.lock().await;
    assert!(shell.toast_marker().is_none());
}

#[tokio::test]
async fn test_sign_out_requires_session() {
    let (status, _) = send(&app(), "POST", "/session/sign-out", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_out_returns_to_landing() {
    let app = app();
    sign_in_as(&app, "student", "ta@ua.edu", "ta123").await;
    send(&app, "POST", "/navigate", Some(json!({ "view": "messages" }))).await;

    let (status, report): (_, NavigationReport) =
        send_json(&app, "POST", "/session/sign-out", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(report.ok);
    assert_eq!(report.active_view.as_deref(), Some("landing"));
    assert_eq!(report.toast.as_deref(), Some("You are signed out."));

    let (_, shell): (_, ShellSnapshot) = send_json(&app, "GET", "/shell", None).await;
    assert_eq!(shell.fragment, "#landing");
    assert!(shell.sidebar_locked);
}

#[tokio::test]
async fn test_hash_change_routes_and_falls_back() {
    let app = app();
    sign_in_as(&app, "student", "ta@ua.edu", "ta123").await;

    let (_, report): (_, NavigationReport) =
        send_json(&app, "POST", "/hash", Some(json!({ "fragment": "#hunts" }))).await;
    assert!(report.ok);
    assert_eq!(report.active_view.as_deref(), Some("hunts"));

    let (_, report): (_, NavigationReport) =
        send_json(&app, "POST", "/hash", Some(json!({ "fragment": "#nope" }))).await;
    assert!(!report.ok);
    assert_eq!(report.requested, "nope");
    assert_eq!(report.active_view.as_deref(), Some("landing"));
    assert_eq!(report.reason.as_deref(), Some("unknown_view"));

    let (_, shell): (_, ShellSnapshot) = send_json(&app, "GET", "/shell", None).await;
    assert_eq!(shell.fragment, "#nope");
}

#[tokio::test]
async fn test_sidebar_toggle_locked_for_guest() {
    let app = app();

    let (_, body): (_, Value) = send_json(&app, "POST", "/sidebar/toggle", None).await;
    assert_eq!(body["toggled"], json!(false));
    assert_eq!(body["collapsed"], Value::Null);

    sign_in_as(&app, "student", "student@ua.edu", "student123").await;
    let (_, body): (_, Value) = send_json(&app, "POST", "/sidebar/toggle", None).await;
    assert_eq!(body["toggled"], json!(true));
    assert_eq!(body["collapsed"], json!(true));
}
