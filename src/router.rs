use std::sync::Arc;

use crate::{
    access::AccessPolicy,
    hash::HashSync,
    models::{Role, Session},
    notify::{Notifier, Scroller},
    registry::{AUTH_VIEW, ViewRegistry},
};

/// Toast shown when a requested view id is not registered.
pub const PAGE_UNAVAILABLE: &str = "Page unavailable.";
/// Toast shown when a guest requests a restricted view.
pub const SIGN_IN_REQUIRED: &str = "Please sign in to access this page.";
/// Toast shown when a signed-in user requests a view outside their role.
pub const NO_PERMISSION: &str = "You do not have permission to view that page.";

/// Redirects are one hop on a validated registry; anything deeper means the data is broken.
const MAX_REDIRECT_DEPTH: u8 = 2;

/// RouteOptions
///
/// Per-navigation switches. Both default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteOptions {
    pub update_hash: bool,
    pub scroll: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            update_hash: true,
            scroll: true,
        }
    }
}

/// RouteRequest
///
/// One navigation attempt: a view id plus its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub view_id: String,
    pub options: RouteOptions,
}

impl RouteRequest {
    pub fn new(view_id: impl Into<String>) -> Self {
        Self {
            view_id: view_id.into(),
            options: RouteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn without_hash_update(mut self) -> Self {
        self.options.update_hash = false;
        self
    }

    pub fn without_scroll(mut self) -> Self {
        self.options.scroll = false;
        self
    }
}

/// Navigated
///
/// A successful transition. `view_id` is the view that is now the sole active one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigated {
    pub view_id: String,
}

/// NavigationError
///
/// Every way a navigation request can fail. None of these are fatal: after any of them
/// the router is still showing a view the current role may see (or nothing, before the
/// first successful navigation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// The id is not in the registry. State is unchanged.
    #[error("view '{0}' is not registered")]
    UnknownView(String),

    /// A guest asked for a restricted view and was sent to the sign-in view.
    #[error("view '{requested}' requires sign-in, redirected to '{redirected_to}'")]
    SignInRequired {
        requested: String,
        redirected_to: String,
    },

    /// A signed-in user asked for a view outside their role and was sent home.
    #[error("role '{role}' may not open '{requested}', redirected to '{redirected_to}'")]
    Forbidden {
        requested: String,
        role: Role,
        redirected_to: String,
    },

    /// The redirect target was itself denied. Only reachable with an invalid registry.
    #[error("redirect for '{requested}' did not settle")]
    RedirectLoop { requested: String },
}

impl NavigationError {
    /// Where the router ended up instead, for the redirecting variants.
    pub fn redirected_to(&self) -> Option<&str> {
        match self {
            NavigationError::SignInRequired { redirected_to, .. }
            | NavigationError::Forbidden { redirected_to, .. } => Some(redirected_to),
            NavigationError::UnknownView(_) | NavigationError::RedirectLoop { .. } => None,
        }
    }

    /// Stable machine-readable tag, used on the wire.
    pub fn reason(&self) -> &'static str {
        match self {
            NavigationError::UnknownView(_) => "unknown_view",
            NavigationError::SignInRequired { .. } => "sign_in_required",
            NavigationError::Forbidden { .. } => "forbidden",
            NavigationError::RedirectLoop { .. } => "redirect_loop",
        }
    }
}

/// ActiveView
///
/// Which view is on screen. `Unset` only before the first successful navigation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Unset,
    Showing(String),
}

impl ActiveView {
    pub fn id(&self) -> Option<&str> {
        match self {
            ActiveView::Unset => None,
            ActiveView::Showing(id) => Some(id),
        }
    }
}

/// NavState
///
/// The highlighted sidebar entry. Follows the active view when it has an entry of its
/// own; otherwise keeps the last match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavState {
    active: Option<String>,
}

impl NavState {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Highlights `route` if it has a nav entry. Returns whether the highlight moved.
    pub fn highlight(&mut self, registry: &ViewRegistry, route: &str) -> bool {
        match registry.resolve(route) {
            Some(view) if view.has_nav_entry() => {
                self.active = Some(view.id.clone());
                true
            }
            _ => false,
        }
    }
}

/// ViewRouter
///
/// The navigation state machine. Owns the active view and nav highlight; the session is
/// read per call so the router never holds a stale role.
pub struct ViewRouter {
    registry: Arc<ViewRegistry>,
    policy: AccessPolicy,
    hash: HashSync,
    notifier: Arc<dyn Notifier>,
    scroller: Arc<dyn Scroller>,
    active: ActiveView,
    nav: NavState,
}

impl ViewRouter {
    pub fn new(
        registry: Arc<ViewRegistry>,
        hash: HashSync,
        notifier: Arc<dyn Notifier>,
        scroller: Arc<dyn Scroller>,
    ) -> Self {
        Self {
            policy: AccessPolicy::new(Arc::clone(&registry)),
            registry,
            hash,
            notifier,
            scroller,
            active: ActiveView::Unset,
            nav: NavState::default(),
        }
    }

    pub fn active_view(&self) -> Option<&str> {
        self.active.id()
    }

    pub fn is_active(&self, view_id: &str) -> bool {
        self.active.id() == Some(view_id)
    }

    pub fn active_nav(&self) -> Option<&str> {
        self.nav.active()
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Moves the nav highlight without navigating (used around sign-in/sign-out).
    pub fn highlight(&mut self, route: &str) -> bool {
        self.nav.highlight(&self.registry, route)
    }

    /// navigate
    ///
    /// Resolves the request against the registry and the session's role, then either
    /// activates the view or redirects:
    ///
    /// 1. Unknown id: toast "Page unavailable.", state unchanged.
    /// 2. Denied while signed out: toast, then navigate to the sign-in view.
    /// 3. Denied while signed in: toast, then navigate to the role's home route.
    /// 4. Allowed: activate, highlight nav, reflect into the fragment, scroll.
    ///
    /// Redirects always update the fragment and report failure for the original request.
    pub fn navigate(
        &mut self,
        session: &Session,
        request: RouteRequest,
    ) -> Result<Navigated, NavigationError> {
        self.route(session, &request.view_id, request.options, 0)
    }

    fn route(
        &mut self,
        session: &Session,
        view_id: &str,
        options: RouteOptions,
        depth: u8,
    ) -> Result<Navigated, NavigationError> {
        // 1. Resolution
        if self.registry.resolve(view_id).is_none() {
            tracing::warn!(view = %view_id, "Navigation to unregistered view");
            self.notifier.notify(PAGE_UNAVAILABLE);
            return Err(NavigationError::UnknownView(view_id.to_string()));
        }

        // 2. Access gate
        if !self.policy.is_allowed(view_id, session.role) {
            if depth + 1 >= MAX_REDIRECT_DEPTH {
                tracing::error!(view = %view_id, role = %session.role, "Redirect target denied");
                return Err(NavigationError::RedirectLoop {
                    requested: view_id.to_string(),
                });
            }

            let (target, message) = if session.authenticated {
                (self.registry.home_route_for(session.role).to_string(), NO_PERMISSION)
            } else {
                (AUTH_VIEW.to_string(), SIGN_IN_REQUIRED)
            };
            tracing::warn!(
                view = %view_id,
                role = %session.role,
                redirect = %target,
                "Navigation denied"
            );
            self.notifier.notify(message);

            let landed = self.route(session, &target, RouteOptions::default(), depth + 1)?;
            return Err(if session.authenticated {
                NavigationError::Forbidden {
                    requested: view_id.to_string(),
                    role: session.role,
                    redirected_to: landed.view_id,
                }
            } else {
                NavigationError::SignInRequired {
                    requested: view_id.to_string(),
                    redirected_to: landed.view_id,
                }
            });
        }

        // 3. Activation
        if let Some(previous) = self.active.id().filter(|previous| *previous != view_id) {
            tracing::debug!(from = %previous, to = %view_id, "View transition");
        }
        self.active = ActiveView::Showing(view_id.to_string());

        // 4. Nav highlight
        self.nav.highlight(&self.registry, view_id);

        // 5. Fragment
        if options.update_hash {
            self.hash.publish(view_id);
        }

        // 6. Focus
        if options.scroll {
            self.scroller.scroll_into_view(view_id);
        }

        Ok(Navigated {
            view_id: view_id.to_string(),
        })
    }
}
