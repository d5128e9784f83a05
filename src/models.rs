use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Identity Schemas ---

/// Role
///
/// The closed set of roles the dashboard knows about. Exactly one role is active per session;
/// `Guest` is the role of every unauthenticated visitor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Guest,
    Student,
    Ta,
    Admin,
}

impl Role {
    /// Every role, in declaration order. Used to expand the "all roles" wildcard.
    pub const ALL: [Role; 4] = [Role::Guest, Role::Student, Role::Ta, Role::Admin];

    /// The token used in `data-roles` style declarations and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Student => "student",
            Role::Ta => "ta",
            Role::Admin => "admin",
        }
    }

    /// label
    ///
    /// Human-facing label shown in the user badge. Teaching assistants are abbreviated
    /// to "TA"; every other role is simply capitalised.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Guest => "Guest",
            Role::Student => "Student",
            Role::Ta => "TA",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UnknownRole
///
/// Raised when a role declaration names a role outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "guest" => Ok(Role::Guest),
            "student" => Ok(Role::Student),
            "ta" => Ok(Role::Ta),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// UserRecord
///
/// An already-validated account, as handed to `RoleSession::sign_in` by the credential store.
/// Passwords never travel with this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserRecord {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub team: String,
}

/// Session
///
/// Read-only snapshot of the process-wide session.
/// Invariant: `authenticated` is true exactly when `role` is not `Guest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Session {
    pub role: Role,
    pub user: Option<UserRecord>,
    pub authenticated: bool,
}

impl Session {
    /// The unauthenticated session every process starts with.
    pub fn guest() -> Self {
        Self {
            role: Role::Guest,
            user: None,
            authenticated: false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::guest()
    }
}

/// LoginPortal
///
/// The two sign-in forms of the shell. The student portal serves students and TAs,
/// the admin portal only accepts the program admin's access code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LoginPortal {
    Student,
    Admin,
}

/// --- Request Payloads (Input Schemas) ---

/// NavigateRequest
///
/// Input payload for POST /navigate. Both flags default to `true` when omitted,
/// matching a plain click on a nav link or card.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateRequest {
    pub view: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_hash: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<bool>,
}

/// HashChangeRequest
///
/// Input payload for POST /hash. Carries the raw address-bar fragment, with or without `#`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HashChangeRequest {
    pub fragment: String,
}

/// SignInRequest
///
/// Input payload for POST /session/sign-in. `password` is the account password on the
/// student portal and the access code on the admin portal.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignInRequest {
    pub portal: LoginPortal,
    pub email: String,
    pub password: String,
}

/// --- Shell Schemas (Output) ---

/// Toast
///
/// The transient notification currently held by the toast collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    #[ts(type = "string")]
    pub shown_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
}

/// NavigationReport
///
/// Outcome of one navigation attempt. Failures are reported here with `ok = false`;
/// `active_view` always names the view that ended up visible, which differs from
/// `requested` after a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationReport {
    pub ok: bool,
    pub requested: String,
    pub active_view: Option<String>,
    /// One of `unknown_view`, `sign_in_required`, `forbidden`, `redirect_loop`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Message emitted to the toast collaborator during this attempt, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<String>,
}

/// ViewSummary
///
/// A registry entry as exposed to the client (GET /views).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ViewSummary {
    pub id: String,
    pub roles: Vec<Role>,
    pub nav_label: Option<String>,
}

/// ShellSnapshot
///
/// Everything the presentation layer needs to paint the shell (GET /shell).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ShellSnapshot {
    pub session: Session,
    pub active_view: Option<String>,
    pub active_nav: Option<String>,
    /// Nav entries visible to the current role, in declaration order.
    pub nav: Vec<String>,
    pub fragment: String,
    pub badge: String,
    pub sidebar_locked: bool,
    pub sidebar_collapsed: bool,
    pub focus: Option<String>,
    /// Latest toast, only while it is still on screen.
    pub toast: Option<Toast>,
}
