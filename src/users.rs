use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{LoginPortal, Role, UserRecord};

/// CredentialError
///
/// Rejections from the credential store. The display text is the toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid student/TA credentials.")]
    InvalidStudentCredentials,
    #[error("Invalid admin access code.")]
    InvalidAdminCode,
}

/// UserStore Trait
///
/// Credential comparison contract. Sits outside the navigation engine: the shell only
/// ever receives the resulting `UserRecord`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Resolves an account on the given portal. Emails are matched case-insensitively and
    /// both inputs are trimmed before comparison.
    async fn authenticate(
        &self,
        portal: LoginPortal,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, CredentialError>;
}

/// UserStoreState
///
/// The concrete type used to share the credential store across the application state.
pub type UserStoreState = Arc<dyn UserStore>;

struct MockAccount {
    user: UserRecord,
    password: &'static str,
}

/// MockUserStore
///
/// In-memory demo accounts: one student, one TA and the program admin.
pub struct MockUserStore {
    accounts: Vec<MockAccount>,
}

impl MockUserStore {
    pub fn new() -> Self {
        let account = |role, name: &str, email: &str, team: &str, password| MockAccount {
            user: UserRecord {
                role,
                name: name.to_string(),
                email: email.to_string(),
                team: team.to_string(),
            },
            password,
        };

        Self {
            accounts: vec![
                account(
                    Role::Student,
                    "Jamie Alvarez",
                    "student@ua.edu",
                    "Team Crimson",
                    "student123",
                ),
                account(
                    Role::Ta,
                    "Marta Rivers",
                    "ta@ua.edu",
                    "Instruction Team",
                    "ta123",
                ),
                account(
                    Role::Admin,
                    "Dr. Reed",
                    "admin@ua.edu",
                    "MIS Leadership",
                    "admin!2024",
                ),
            ],
        }
    }
}

impl Default for MockUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn authenticate(
        &self,
        portal: LoginPortal,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, CredentialError> {
        let email = email.trim().to_lowercase();
        let password = password.trim();

        let matches = |account: &&MockAccount| {
            account.user.email == email && account.password == password
        };

        match portal {
            // The student form serves students and TAs, never the admin.
            LoginPortal::Student => self
                .accounts
                .iter()
                .filter(|account| account.user.role != Role::Admin)
                .find(matches)
                .map(|account| account.user.clone())
                .ok_or(CredentialError::InvalidStudentCredentials),
            LoginPortal::Admin => self
                .accounts
                .iter()
                .filter(|account| account.user.role == Role::Admin)
                .find(matches)
                .map(|account| account.user.clone())
                .ok_or(CredentialError::InvalidAdminCode),
        }
    }
}
