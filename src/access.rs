use std::sync::Arc;

use crate::{
    models::{Role, UnknownRole},
    registry::ViewRegistry,
};

/// RoleSet
///
/// The roles permitted to see a view. Mirrors the markup convention where a missing or
/// empty `data-roles` attribute means "everyone".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSet {
    All,
    Only(Vec<Role>),
}

impl RoleSet {
    /// parse
    ///
    /// Reads a comma-separated role declaration (`"student, ta"`).
    /// `None` or a blank string yields the `All` wildcard. Unknown role names are an error.
    pub fn parse(declaration: Option<&str>) -> Result<Self, UnknownRole> {
        let Some(raw) = declaration.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(RoleSet::All);
        };

        let mut roles = Vec::new();
        for token in raw.split(',') {
            let role: Role = token.parse()?;
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        Ok(RoleSet::Only(roles))
    }

    pub fn contains(&self, role: Role) -> bool {
        match self {
            RoleSet::All => true,
            RoleSet::Only(roles) => roles.contains(&role),
        }
    }

    /// The explicit role list, with the wildcard expanded to every role.
    pub fn roles(&self) -> Vec<Role> {
        match self {
            RoleSet::All => Role::ALL.to_vec(),
            RoleSet::Only(roles) => roles.clone(),
        }
    }
}

/// AccessPolicy
///
/// Pure role gate over the view registry. There is no failure path: an unknown view id is
/// simply not allowed for anyone.
#[derive(Clone)]
pub struct AccessPolicy {
    registry: Arc<ViewRegistry>,
}

impl AccessPolicy {
    pub fn new(registry: Arc<ViewRegistry>) -> Self {
        Self { registry }
    }

    /// is_allowed
    ///
    /// True when `view_id` is registered and its permitted-roles set contains `role`.
    pub fn is_allowed(&self, view_id: &str, role: Role) -> bool {
        self.registry
            .resolve(view_id)
            .is_some_and(|view| view.roles.contains(role))
    }
}
