use std::collections::HashMap;

use crate::{
    access::RoleSet,
    models::{Role, UnknownRole, ViewSummary},
};

/// The view shown to guests and used for an empty address-bar fragment.
pub const LANDING_VIEW: &str = "landing";
/// The sign-in view every unauthenticated denial redirects to.
pub const AUTH_VIEW: &str = "auth";

/// View
///
/// A registered page of the shell. `nav_label` is set when the sidebar carries an entry
/// for this view; views without one (detail pages) leave the nav highlight untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub id: String,
    pub roles: RoleSet,
    pub nav_label: Option<String>,
}

impl View {
    pub fn has_nav_entry(&self) -> bool {
        self.nav_label.is_some()
    }

    pub fn summary(&self) -> ViewSummary {
        ViewSummary {
            id: self.id.clone(),
            roles: self.roles.roles(),
            nav_label: self.nav_label.clone(),
        }
    }
}

/// ViewDecl
///
/// One row of a registry table. `roles` uses the comma-separated declaration syntax
/// understood by `RoleSet::parse`.
#[derive(Debug, Clone, Copy)]
pub struct ViewDecl {
    pub id: &'static str,
    pub roles: Option<&'static str>,
    pub nav_label: Option<&'static str>,
}

const fn decl(
    id: &'static str,
    roles: Option<&'static str>,
    nav_label: Option<&'static str>,
) -> ViewDecl {
    ViewDecl {
        id,
        roles,
        nav_label,
    }
}

/// The views of the scavenger-hunt dashboard.
pub const DASHBOARD_VIEWS: &[ViewDecl] = &[
    decl(LANDING_VIEW, None, Some("Home")),
    decl(AUTH_VIEW, Some("guest"), Some("Sign In")),
    decl("student-dashboard", Some("student"), Some("Dashboard")),
    decl("instructor-dashboard", Some("ta"), Some("Instructor")),
    decl("admin", Some("admin"), Some("Admin")),
    decl("hunts", Some("student, ta, admin"), Some("Hunts")),
    decl("hunt-detail", Some("student, ta, admin"), None),
    decl("leaderboard", Some("student, ta, admin"), Some("Leaderboard")),
    decl("peer-profile", Some("student, ta, admin"), None),
    decl("profile", Some("student"), Some("Profile")),
    decl("admin-profile", Some("ta, admin"), Some("Staff Profile")),
    decl("messages", Some("student, ta"), Some("Messages")),
];

/// Landing view of each role, used after sign-in and as the fallback on a denied request.
pub const DASHBOARD_HOME_ROUTES: &[(Role, &str)] = &[
    (Role::Guest, LANDING_VIEW),
    (Role::Student, "student-dashboard"),
    (Role::Ta, "instructor-dashboard"),
    (Role::Admin, "admin"),
];

/// RegistryError
///
/// Configuration defects in a registry table. These are caught at startup by
/// `ViewRegistry::validate`, never at navigation time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("view '{0}' is declared more than once")]
    DuplicateView(String),

    #[error("view '{view}' has an invalid role declaration: {source}")]
    InvalidRoles {
        view: String,
        #[source]
        source: UnknownRole,
    },

    #[error("required view '{0}' is not registered")]
    MissingView(String),

    #[error("view '{0}' must be visible to guests")]
    NotGuestVisible(String),

    #[error("role '{0}' has no home route")]
    MissingHomeRoute(Role),

    #[error("home route '{view}' of role '{role}' is not permitted for that role")]
    HomeRouteDenied { role: Role, view: String },
}

/// ViewRegistry
///
/// Static, read-only mapping from view id to metadata, plus the per-role home routes.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    views: Vec<View>,
    index: HashMap<String, usize>,
    home_routes: HashMap<Role, String>,
}

impl ViewRegistry {
    /// dashboard
    ///
    /// Builds and validates the shipped dashboard registry.
    pub fn dashboard() -> Result<Self, RegistryError> {
        let registry = Self::from_decls(DASHBOARD_VIEWS, DASHBOARD_HOME_ROUTES)?;
        registry.validate()?;
        Ok(registry)
    }

    /// from_decls
    ///
    /// Parses a registry table. Structural problems (duplicate ids, bad role tokens,
    /// missing home routes) are rejected here; cross-references are left to `validate`.
    pub fn from_decls(
        decls: &[ViewDecl],
        home_routes: &[(Role, &str)],
    ) -> Result<Self, RegistryError> {
        let mut views = Vec::with_capacity(decls.len());
        let mut index = HashMap::with_capacity(decls.len());

        for decl in decls {
            if index.contains_key(decl.id) {
                return Err(RegistryError::DuplicateView(decl.id.to_string()));
            }
            let roles = RoleSet::parse(decl.roles).map_err(|source| RegistryError::InvalidRoles {
                view: decl.id.to_string(),
                source,
            })?;
            index.insert(decl.id.to_string(), views.len());
            views.push(View {
                id: decl.id.to_string(),
                roles,
                nav_label: decl.nav_label.map(str::to_string),
            });
        }

        let home_routes: HashMap<Role, String> = home_routes
            .iter()
            .map(|(role, view)| (*role, view.to_string()))
            .collect();
        if let Some(role) = Role::ALL.into_iter().find(|role| !home_routes.contains_key(role)) {
            return Err(RegistryError::MissingHomeRoute(role));
        }

        Ok(Self {
            views,
            index,
            home_routes,
        })
    }

    /// validate
    ///
    /// Checks the data invariants the router's redirect logic depends on:
    /// the landing and auth views exist and are guest-visible, and every role's home
    /// route exists and is permitted for that role. A registry that passes cannot send
    /// the router into a redirect loop.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for required in [LANDING_VIEW, AUTH_VIEW] {
            let view = self
                .resolve(required)
                .ok_or_else(|| RegistryError::MissingView(required.to_string()))?;
            if !view.roles.contains(Role::Guest) {
                return Err(RegistryError::NotGuestVisible(required.to_string()));
            }
        }

        for role in Role::ALL {
            let home = self.home_route_for(role);
            let permitted = self
                .resolve(home)
                .is_some_and(|view| view.roles.contains(role));
            if !permitted {
                return Err(RegistryError::HomeRouteDenied {
                    role,
                    view: home.to_string(),
                });
            }
        }

        tracing::debug!(views = self.views.len(), "View registry validated");
        Ok(())
    }

    pub fn resolve(&self, view_id: &str) -> Option<&View> {
        self.index.get(view_id).map(|&position| &self.views[position])
    }

    /// home_route_for
    ///
    /// The designated landing view of `role`. Construction guarantees an entry for every
    /// role; the landing view is returned defensively otherwise.
    pub fn home_route_for(&self, role: Role) -> &str {
        self.home_routes
            .get(&role)
            .map(String::as_str)
            .unwrap_or(LANDING_VIEW)
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    /// Views `role` may open, in declaration order.
    pub fn visible_to(&self, role: Role) -> impl Iterator<Item = &View> {
        self.views.iter().filter(move |view| view.roles.contains(role))
    }

    /// Sidebar entries `role` can see, in declaration order.
    pub fn nav_entries_for(&self, role: Role) -> impl Iterator<Item = &View> {
        self.visible_to(role).filter(|view| view.has_nav_entry())
    }
}
