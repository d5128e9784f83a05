use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    hash::{AddressBar, HashSync},
    models::{NavigationReport, Session, ShellSnapshot, UserRecord},
    notify::{FocusTracker, Notifier, Scroller, ToastBoard},
    observers::{NavVisibility, SidebarState, UserBadge},
    registry::{LANDING_VIEW, ViewRegistry},
    router::{NavigationError, Navigated, RouteRequest, ViewRouter},
    session::{RoleSession, SessionError, SessionObserver},
    users::CredentialError,
};

/// Toast shown after signing out.
pub const SIGNED_OUT: &str = "You are signed out.";
/// Toast shown when the locked sidebar is toggled.
pub const SIDEBAR_LOCKED: &str = "Sign in to open the navigation.";

/// ShellError
///
/// Failure of a session change driven through the shell. `Session` means nothing
/// happened; `Navigation` means the session changed but the landing navigation did not
/// go as requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// DashboardShell
///
/// Wires the session, router, address bar and collaborators together. Every public
/// method is one UI event and runs to completion before returning.
pub struct DashboardShell {
    session: RoleSession,
    router: ViewRouter,
    hash: HashSync,
    toasts: Arc<ToastBoard>,
    focus: Arc<FocusTracker>,
    badge: Arc<UserBadge>,
    sidebar: Arc<SidebarState>,
    nav: Arc<NavVisibility>,
}

/// SharedShell
///
/// The single exclusive lock every handler goes through, so navigation and session
/// calls never interleave.
pub type SharedShell = Arc<Mutex<DashboardShell>>;

impl DashboardShell {
    pub fn new(
        registry: Arc<ViewRegistry>,
        address_bar: Arc<dyn AddressBar>,
        toasts: ToastBoard,
    ) -> Self {
        let hash = HashSync::new(address_bar);
        let toasts = Arc::new(toasts);
        let focus = Arc::new(FocusTracker::new());
        let router = ViewRouter::new(
            Arc::clone(&registry),
            hash.clone(),
            Arc::clone(&toasts) as Arc<dyn Notifier>,
            Arc::clone(&focus) as Arc<dyn Scroller>,
        );

        let badge = Arc::new(UserBadge::new());
        let sidebar = Arc::new(SidebarState::new());
        let nav = Arc::new(NavVisibility::new(registry));

        let mut session = RoleSession::new();
        session.subscribe(Arc::clone(&badge) as Arc<dyn SessionObserver>);
        session.subscribe(Arc::clone(&sidebar) as Arc<dyn SessionObserver>);
        session.subscribe(Arc::clone(&nav) as Arc<dyn SessionObserver>);

        Self {
            session,
            router,
            hash,
            toasts,
            focus,
            badge,
            sidebar,
            nav,
        }
    }

    pub fn into_shared(self) -> SharedShell {
        Arc::new(Mutex::new(self))
    }

    /// boot
    ///
    /// Initial inbound pass on load: route to whatever the fragment names
    /// (the landing view when it is empty).
    pub fn boot(&mut self) -> Result<Navigated, NavigationError> {
        self.hash_changed()
    }

    /// Navigation trigger surface: any link, button or card carrying a view id.
    pub fn navigate(&mut self, request: RouteRequest) -> Result<Navigated, NavigationError> {
        self.router.navigate(self.session.state(), request)
    }

    /// Inbound fragment-change notification. The address bar already holds the new value.
    pub fn hash_changed(&mut self) -> Result<Navigated, NavigationError> {
        self.hash.on_fragment_change(&mut self.router, self.session.state())
    }

    /// The user moved the address bar to `fragment` (typed it, followed a link, went back).
    pub fn fragment_changed(&mut self, fragment: &str) -> Result<Navigated, NavigationError> {
        self.hash.record_external(fragment);
        self.hash_changed()
    }

    /// sign_in
    ///
    /// Authenticates the session as `user`, then lands on the role's home route and
    /// greets the user. A refused record leaves the session, view and toasts untouched.
    pub fn sign_in(&mut self, user: UserRecord) -> Result<Navigated, ShellError> {
        let greeting = format!("Welcome back, {}!", user.name);
        self.session.sign_in(user)?;

        let home = self
            .router
            .registry()
            .home_route_for(self.session.role())
            .to_string();
        self.router.highlight(&home);
        let outcome = self.router.navigate(self.session.state(), RouteRequest::new(home));
        self.toasts.notify(&greeting);
        outcome.map_err(ShellError::from)
    }

    /// sign_out
    ///
    /// Drops back to the guest session and the landing view, wherever the user was.
    /// Without a signed-in session this is `SessionError::NotSignedIn` and a no-op.
    pub fn sign_out(&mut self) -> Result<Navigated, ShellError> {
        self.session.sign_out()?;
        self.router.highlight(LANDING_VIEW);
        let outcome = self
            .router
            .navigate(self.session.state(), RouteRequest::new(LANDING_VIEW));
        self.toasts.notify(SIGNED_OUT);
        outcome.map_err(ShellError::from)
    }

    /// Surfaces a credential rejection to the user. The session is left untouched.
    pub fn reject_sign_in(&self, error: &CredentialError) {
        tracing::info!(%error, "Sign-in rejected");
        self.toasts.notify(&error.to_string());
    }

    /// toggle_sidebar
    ///
    /// Returns the new collapsed state, or `None` if the sidebar is locked for guests.
    pub fn toggle_sidebar(&mut self) -> Option<bool> {
        let toggled = self.sidebar.toggle();
        if toggled.is_none() {
            self.toasts.notify(SIDEBAR_LOCKED);
        }
        toggled
    }

    pub fn session(&self) -> Session {
        self.session.current()
    }

    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    pub fn toasts(&self) -> &ToastBoard {
        &self.toasts
    }

    pub fn fragment(&self) -> String {
        self.hash.fragment()
    }

    /// Id of the latest toast, used to tell whether a call emitted one.
    pub fn toast_marker(&self) -> Option<Uuid> {
        self.toasts.latest().map(|toast| toast.id)
    }

    /// report
    ///
    /// Describes the outcome of a navigation for the client. `marker` is the value of
    /// `toast_marker` taken before the call.
    pub fn report(
        &self,
        requested: &str,
        outcome: &Result<Navigated, NavigationError>,
        marker: Option<Uuid>,
    ) -> NavigationReport {
        let toast = self
            .toasts
            .latest()
            .filter(|toast| Some(toast.id) != marker)
            .map(|toast| toast.message);

        NavigationReport {
            ok: outcome.is_ok(),
            requested: requested.to_string(),
            active_view: self.router.active_view().map(str::to_string),
            reason: outcome
                .as_ref()
                .err()
                .map(|error| error.reason().to_string()),
            toast,
        }
    }

    /// Everything the client needs to paint the shell at `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> ShellSnapshot {
        ShellSnapshot {
            session: self.session.current(),
            active_view: self.router.active_view().map(str::to_string),
            active_nav: self.router.active_nav().map(str::to_string),
            nav: self.nav.visible(),
            fragment: self.hash.fragment(),
            badge: self.badge.label(),
            sidebar_locked: self.sidebar.is_locked(),
            sidebar_collapsed: self.sidebar.is_collapsed(),
            focus: self.focus.last_focused(),
            toast: self.toasts.visible_at(now),
        }
    }
}
