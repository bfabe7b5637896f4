//! The resolved identity session.
//!
//! A session is produced exactly once by the bootstrapper and is read-only
//! afterwards. It is either authenticated, carrying decoded token claims, or
//! anonymous (the user was not asked to log in and had no session with the
//! provider).

use serde::{Deserialize, Serialize};

use crate::claims::TokenClaims;

/// An authenticated or explicitly anonymous session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    authenticated: bool,
    claims: Option<TokenClaims>,
}

impl Session {
    /// Creates an authenticated session from decoded token claims.
    #[must_use]
    pub fn authenticated(claims: TokenClaims) -> Self {
        Self {
            authenticated: true,
            claims: Some(claims),
        }
    }

    /// Creates a session for a visitor without a provider session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            claims: None,
        }
    }

    /// Returns true if the user authenticated with the provider.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns the decoded token claims of an authenticated session.
    #[must_use]
    pub fn claims(&self) -> Option<&TokenClaims> {
        self.claims.as_ref()
    }

    /// Returns true if the realm grants the named role.
    #[must_use]
    pub fn has_realm_role(&self, role: &str) -> bool {
        self.claims
            .as_ref()
            .is_some_and(|c| c.realm_roles().contains(role))
    }

    /// Returns true if the named role is granted on the client `resource_id`.
    #[must_use]
    pub fn has_resource_role(&self, role: &str, resource_id: &str) -> bool {
        self.claims
            .as_ref()
            .and_then(|c| c.resource_roles(resource_id))
            .is_some_and(|roles| roles.contains(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::RoleSet;

    #[test]
    fn anonymous_session_holds_nothing() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.claims().is_none());
        assert!(!session.has_realm_role("Employee"));
        assert!(!session.has_resource_role("Employee", "quarkus-api"));
    }

    #[test]
    fn authenticated_session_exposes_claims() {
        let claims = TokenClaims::new("abc")
            .with_realm_roles(["Employee"].into_iter().collect::<RoleSet>())
            .with_resource_roles(
                "quarkus-api",
                ["Representative"].into_iter().collect::<RoleSet>(),
            );
        let session = Session::authenticated(claims);

        assert!(session.is_authenticated());
        assert_eq!(session.claims().map(|c| c.sub.as_str()), Some("abc"));
        assert!(session.has_realm_role("Employee"));
        assert!(!session.has_realm_role("Representative"));
        assert!(session.has_resource_role("Representative", "quarkus-api"));
        assert!(!session.has_resource_role("Employee", "quarkus-api"));
        assert!(!session.has_resource_role("Representative", "account"));
    }

    #[test]
    fn authenticated_without_roles_is_still_authenticated() {
        let session = Session::authenticated(TokenClaims::new("abc"));
        assert!(session.is_authenticated());
        assert!(!session.has_realm_role("Employee"));
    }
}
