use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};

use crate::{models::UserRecord, shell::SharedShell};

/// SignedIn Extractor Result
///
/// The user currently holding the shell session. Handlers that only make sense for a
/// signed-in user take this as an argument.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: UserRecord,
}

/// SignedIn Extractor Implementation
///
/// Reads the shell session under its lock. The session is the only authentication state
/// there is: a guest session is rejected with 401 Unauthorized before the handler runs.
impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
    SharedShell: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shell = SharedShell::from_ref(state);
        let session = shell.lock().await.session();

        match (session.authenticated, session.user) {
            (true, Some(user)) => Ok(SignedIn { user }),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}
