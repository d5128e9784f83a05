/// Router Module Index
///
/// Splits the shell's HTTP surface by who may call it. Session-bound routes are wrapped
/// in the `SignedIn` gate in `create_router`.

/// Routes any visitor may call (navigation, fragment changes, sign-in).
pub mod public;

/// Routes that require a signed-in session.
pub mod session;
