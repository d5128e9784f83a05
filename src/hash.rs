use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    models::Session,
    registry::LANDING_VIEW,
    router::{NavigationError, Navigated, RouteRequest, ViewRouter},
};

/// AddressBar
///
/// The address-bar fragment as seen by the shell. `fragment` returns the raw value
/// including the leading `#`, or an empty string when there is none.
pub trait AddressBar: Send + Sync {
    fn fragment(&self) -> String;

    /// Overwrites the current history entry. The router only ever writes this way.
    fn replace_fragment(&self, fragment: &str);

    /// Records a new history entry from outside the shell (typed fragment, link, back/forward).
    fn push_fragment(&self, fragment: &str);
}

/// MemoryAddressBar
///
/// In-process address bar with a browser-like history stack.
pub struct MemoryAddressBar {
    history: Mutex<Vec<String>>,
}

impl MemoryAddressBar {
    pub fn new() -> Self {
        Self::with_fragment("")
    }

    pub fn with_fragment(fragment: &str) -> Self {
        Self {
            history: Mutex::new(vec![fragment.to_string()]),
        }
    }

    /// Every history entry, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryAddressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressBar for MemoryAddressBar {
    fn fragment(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn replace_fragment(&self, fragment: &str) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        match history.last_mut() {
            Some(current) => *current = fragment.to_string(),
            None => history.push(fragment.to_string()),
        }
    }

    fn push_fragment(&self, fragment: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fragment.to_string());
    }
}

/// route_from_fragment
///
/// Maps a raw fragment to a view id: the leading `#` is dropped and an empty fragment
/// means the landing view.
pub fn route_from_fragment(fragment: &str) -> &str {
    let route = fragment.strip_prefix('#').unwrap_or(fragment).trim();
    if route.is_empty() { LANDING_VIEW } else { route }
}

/// HashSync
///
/// Two-way bridge between the address-bar fragment and the router.
///
/// * Outbound (`publish`): called by the router after a successful navigation with
///   `update_hash`; replaces the fragment only when it differs.
/// * Inbound (`on_fragment_change`): called on load and on every external fragment
///   change; navigates with `update_hash = false` so the two edges cannot feed each other.
#[derive(Clone)]
pub struct HashSync {
    bar: Arc<dyn AddressBar>,
}

impl HashSync {
    pub fn new(bar: Arc<dyn AddressBar>) -> Self {
        Self { bar }
    }

    pub fn fragment(&self) -> String {
        self.bar.fragment()
    }

    /// Records an external fragment change. Routing happens in `on_fragment_change`.
    pub fn record_external(&self, fragment: &str) {
        let fragment = fragment.trim();
        let normalized = match fragment.strip_prefix('#') {
            Some(_) => fragment.to_string(),
            None if fragment.is_empty() => String::new(),
            None => format!("#{fragment}"),
        };
        self.bar.push_fragment(&normalized);
    }

    /// The view id the current fragment points at.
    pub fn current_route(&self) -> String {
        route_from_fragment(&self.bar.fragment()).to_string()
    }

    /// publish
    ///
    /// Reflects `view_id` into the address bar with replace semantics.
    /// Returns whether the fragment actually changed.
    pub fn publish(&self, view_id: &str) -> bool {
        let target = format!("#{view_id}");
        if self.bar.fragment() == target {
            return false;
        }
        self.bar.replace_fragment(&target);
        tracing::debug!(fragment = %target, "Address bar fragment replaced");
        true
    }

    /// on_fragment_change
    ///
    /// Routes to whatever the fragment names. The router's own fallbacks handle denied
    /// views. An unknown id leaves the router untouched, so the landing view is shown
    /// in its place unless the landing view itself was the request.
    pub fn on_fragment_change(
        &self,
        router: &mut ViewRouter,
        session: &Session,
    ) -> Result<Navigated, NavigationError> {
        let route = self.current_route();
        tracing::debug!(route = %route, "Inbound fragment change");

        let outcome = router.navigate(session, RouteRequest::new(&route).without_hash_update());
        if let Err(NavigationError::UnknownView(_)) = &outcome {
            if route != LANDING_VIEW {
                // A denial here falls through to the router's own redirect.
                if let Err(error) = router.navigate(
                    session,
                    RouteRequest::new(LANDING_VIEW).without_hash_update(),
                ) {
                    tracing::warn!(%error, route = %route, "Landing fallback failed");
                }
            }
        }
        outcome
    }
}
