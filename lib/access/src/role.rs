//! Role names and role membership checks.
//!
//! Roles are opaque names granted by the identity provider, either at realm
//! scope or scoped to one registered client. Which of the two scopes a
//! deployment consults is chosen once at startup through [`RoleCheck`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::Session;

/// An opaque role name such as `Employee` or `Representative`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Creates a role from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Set of role names, kept sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Role>", into = "Vec<Role>")]
pub struct RoleSet {
    roles: Vec<Role>,
}

impl RoleSet {
    /// Creates an empty role set.
    #[must_use]
    pub fn none() -> Self {
        Self { roles: Vec::new() }
    }

    /// Returns true if the named role is in the set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.roles
            .binary_search_by(|r| r.as_str().cmp(name))
            .is_ok()
    }

    /// Returns the roles as a sorted slice.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns true if the set holds no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(mut roles: Vec<Role>) -> Self {
        roles.sort();
        roles.dedup();
        Self { roles }
    }
}

impl From<RoleSet> for Vec<Role> {
    fn from(set: RoleSet) -> Self {
        set.roles
    }
}

impl<R: Into<Role>> FromIterator<R> for RoleSet {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        iter.into_iter().map(Into::into).collect::<Vec<Role>>().into()
    }
}

/// Strategy deciding where a role name is looked up in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum RoleCheck {
    /// Roles granted at realm scope.
    Realm,
    /// Roles granted on one client, e.g. the backing API's client.
    Resource { client_id: String },
}

impl RoleCheck {
    /// Returns true if the session holds the named role under this strategy.
    #[must_use]
    pub fn holds(&self, session: &Session, role: &str) -> bool {
        match self {
            Self::Realm => session.has_realm_role(role),
            Self::Resource { client_id } => session.has_resource_role(role, client_id),
        }
    }

    /// Returns true if the session holds at least one of the given roles.
    #[must_use]
    pub fn holds_any(&self, session: &Session, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.holds(session, r.as_str()))
    }
}
