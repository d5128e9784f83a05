use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::models::Toast;

/// Default on-screen time of a toast.
pub const DEFAULT_TOAST_TTL_MS: u64 = 3000;

/// Notifier
///
/// The toast collaborator. Accepts a plain message and displays it transiently.
/// Calls are fire-and-forget: the router never waits on or inspects the display.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// ToastBoard
///
/// Holds the single toast currently on screen. Each call replaces the message and
/// restarts the display timer; rapid repeats are not coalesced.
pub struct ToastBoard {
    ttl: TimeDelta,
    current: Mutex<Option<Toast>>,
}

impl ToastBoard {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            current: Mutex::new(None),
        }
    }

    pub fn with_ttl_ms(ttl_ms: u64) -> Self {
        let ttl_ms = i64::try_from(ttl_ms).unwrap_or(i64::MAX);
        Self::new(TimeDelta::try_milliseconds(ttl_ms).unwrap_or(TimeDelta::MAX))
    }

    /// show_at
    ///
    /// Displays `message` as of `now`. Split out from `notify` so tests can drive the clock.
    pub fn show_at(&self, message: &str, now: DateTime<Utc>) -> Toast {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.to_string(),
            shown_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(toast.clone());
        toast
    }

    /// The most recent toast, whether or not it is still visible.
    pub fn latest(&self) -> Option<Toast> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The toast on screen at `now`, if its timer has not run out.
    pub fn visible_at(&self, now: DateTime<Utc>) -> Option<Toast> {
        self.latest().filter(|toast| now < toast.expires_at)
    }
}

impl Default for ToastBoard {
    fn default() -> Self {
        Self::with_ttl_ms(DEFAULT_TOAST_TTL_MS)
    }
}

impl Notifier for ToastBoard {
    fn notify(&self, message: &str) {
        tracing::debug!(message, "Toast shown");
        self.show_at(message, Utc::now());
    }
}

/// Scroller
///
/// The scroll collaborator. Brings a view into the viewport; purely cosmetic, so it has
/// no way to report failure.
pub trait Scroller: Send + Sync {
    fn scroll_into_view(&self, view_id: &str);
}

/// FocusTracker
///
/// Headless scroller: remembers the last view asked to be brought into focus so the
/// client can perform the smooth scroll itself.
#[derive(Default)]
pub struct FocusTracker {
    last: Mutex<Option<String>>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_focused(&self) -> Option<String> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Scroller for FocusTracker {
    fn scroll_into_view(&self, view_id: &str) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(view_id.to_string());
    }
}
