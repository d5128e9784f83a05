use std::sync::Arc;

use crate::models::{Role, Session, UserRecord};

/// SessionObserver
///
/// Anything that must be refreshed synchronously after sign-in or sign-out
/// (badge, sidebar lock, role-aware nav visibility).
pub trait SessionObserver: Send + Sync {
    fn session_changed(&self, session: &Session);
}

/// SessionError
///
/// A session change that was refused. The session is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("account '{email}' has the guest role and cannot sign in")]
    GuestRecord { email: String },

    #[error("no user is signed in")]
    NotSignedIn,
}

/// RoleSession
///
/// The process-wide session. Starts unauthenticated and is only ever mutated through
/// `sign_in` / `sign_out`, both of which notify every subscribed observer before returning.
pub struct RoleSession {
    state: Session,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl RoleSession {
    pub fn new() -> Self {
        Self {
            state: Session::guest(),
            observers: Vec::new(),
        }
    }

    /// Registers an observer and immediately brings it in sync with the current session.
    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) {
        observer.session_changed(&self.state);
        self.observers.push(observer);
    }

    /// sign_in
    ///
    /// Marks the session authenticated as `user`. Credentials must already have been
    /// checked by the caller.
    ///
    /// # Errors
    /// `GuestRecord` if the record carries the guest role; observers are not notified.
    pub fn sign_in(&mut self, user: UserRecord) -> Result<(), SessionError> {
        if user.role == Role::Guest {
            tracing::warn!(email = %user.email, "Refusing sign-in with a guest-role record");
            return Err(SessionError::GuestRecord { email: user.email });
        }

        tracing::info!(email = %user.email, role = %user.role, "Session signed in");
        self.state = Session {
            role: user.role,
            user: Some(user),
            authenticated: true,
        };
        self.notify_observers();
        Ok(())
    }

    /// Resets to the unauthenticated guest session. Fails with `NotSignedIn` when there is
    /// no session to end.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        if !self.state.authenticated {
            return Err(SessionError::NotSignedIn);
        }
        if let Some(user) = &self.state.user {
            tracing::info!(email = %user.email, "Session signed out");
        }
        self.state = Session::guest();
        self.notify_observers();
        Ok(())
    }

    pub fn current(&self) -> Session {
        self.state.clone()
    }

    /// Borrowed view of the session, for callers that only read it.
    pub fn state(&self) -> &Session {
        &self.state
    }

    pub fn role(&self) -> Role {
        self.state.role
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    fn notify_observers(&self) {
        for observer in &self.observers {
            observer.session_changed(&self.state);
        }
    }
}

impl Default for RoleSession {
    fn default() -> Self {
        Self::new()
    }
}
