use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crate::{models::Session, registry::ViewRegistry, session::SessionObserver};

const SIGNED_OUT_BADGE: &str = "Signed out";

/// badge_label
///
/// "Signed out" for guests, otherwise "{name} · {role label}".
pub fn badge_label(session: &Session) -> String {
    match (&session.user, session.authenticated) {
        (Some(user), true) => format!("{} · {}", user.name, session.role.label()),
        _ => SIGNED_OUT_BADGE.to_string(),
    }
}

/// UserBadge
///
/// Header badge naming the signed-in user.
pub struct UserBadge {
    label: Mutex<String>,
}

impl UserBadge {
    pub fn new() -> Self {
        Self {
            label: Mutex::new(SIGNED_OUT_BADGE.to_string()),
        }
    }

    pub fn label(&self) -> String {
        self.label.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for UserBadge {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for UserBadge {
    fn session_changed(&self, session: &Session) {
        *self.label.lock().unwrap_or_else(PoisonError::into_inner) = badge_label(session);
    }
}

/// SidebarState
///
/// The sidebar is locked and collapsed while signed out, and unlocked and expanded on
/// sign-in. Only an unlocked sidebar can be toggled.
pub struct SidebarState {
    locked: AtomicBool,
    collapsed: AtomicBool,
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            locked: AtomicBool::new(true),
            collapsed: AtomicBool::new(true),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed.load(Ordering::SeqCst)
    }

    /// Flips the collapsed flag. Returns `None` while locked, otherwise the new state.
    pub fn toggle(&self) -> Option<bool> {
        if self.is_locked() {
            return None;
        }
        let collapsed = !self.collapsed.fetch_xor(true, Ordering::SeqCst);
        Some(collapsed)
    }
}

impl Default for SidebarState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for SidebarState {
    fn session_changed(&self, session: &Session) {
        let lock = !session.authenticated;
        self.locked.store(lock, Ordering::SeqCst);
        self.collapsed.store(lock, Ordering::SeqCst);
    }
}

/// NavVisibility
///
/// The sidebar entries shown for the current role. Entries whose view the role cannot
/// open are hidden.
pub struct NavVisibility {
    registry: Arc<ViewRegistry>,
    visible: Mutex<Vec<String>>,
}

impl NavVisibility {
    pub fn new(registry: Arc<ViewRegistry>) -> Self {
        Self {
            registry,
            visible: Mutex::new(Vec::new()),
        }
    }

    pub fn visible(&self) -> Vec<String> {
        self.visible.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionObserver for NavVisibility {
    fn session_changed(&self, session: &Session) {
        let entries = self
            .registry
            .nav_entries_for(session.role)
            .map(|view| view.id.clone())
            .collect();
        *self.visible.lock().unwrap_or_else(PoisonError::into_inner) = entries;
    }
}
