//! Access token claims.
//!
//! Keycloak places realm roles under `realm_access.roles` and client roles
//! under `resource_access.<client>.roles`. Only the claims the guard and the
//! views need are modelled. Signature verification is the identity
//! collaborator's job; by the time a token reaches [`TokenClaims::from_jwt`]
//! it has come straight from the provider's token endpoint.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ClaimsError;
use crate::role::RoleSet;

/// Role grants under one scope (`realm_access` or one `resource_access` entry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    #[serde(default)]
    pub roles: RoleSet,
}

/// Decoded access token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject identifier.
    pub sub: String,
    /// Expiry as seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Realm-scoped roles.
    #[serde(default)]
    pub realm_access: Access,
    /// Client-scoped roles keyed by client identifier.
    #[serde(default)]
    pub resource_access: BTreeMap<String, Access>,
}

impl TokenClaims {
    /// Creates claims for a subject with no roles.
    #[must_use]
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            exp: None,
            preferred_username: None,
            name: None,
            email: None,
            realm_access: Access::default(),
            resource_access: BTreeMap::new(),
        }
    }

    /// Decodes the payload segment of a compact JWT.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not have three segments or the
    /// payload is not base64url-encoded JSON claims.
    pub fn from_jwt(token: &str) -> Result<Self, ClaimsError> {
        let mut parts = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ClaimsError::Malformed);
        };

        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClaimsError::Encoding {
                reason: e.to_string(),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| ClaimsError::Payload {
            reason: e.to_string(),
        })
    }

    /// Sets realm-scoped roles.
    #[must_use]
    pub fn with_realm_roles(mut self, roles: RoleSet) -> Self {
        self.realm_access = Access { roles };
        self
    }

    /// Sets the roles granted on one client.
    #[must_use]
    pub fn with_resource_roles(mut self, client_id: impl Into<String>, roles: RoleSet) -> Self {
        self.resource_access
            .insert(client_id.into(), Access { roles });
        self
    }

    /// Drops the role grants of every client other than `client_id`.
    #[must_use]
    pub fn retain_client(mut self, client_id: &str) -> Self {
        self.resource_access.retain(|client, _| client == client_id);
        self
    }

    /// Returns the realm-scoped roles.
    #[must_use]
    pub fn realm_roles(&self) -> &RoleSet {
        &self.realm_access.roles
    }

    /// Returns the roles granted on `client_id`, if the token carries any.
    #[must_use]
    pub fn resource_roles(&self, client_id: &str) -> Option<&RoleSet> {
        self.resource_access.get(client_id).map(|a| &a.roles)
    }

    /// Returns true if the token expired at or before `now` (Unix seconds).
    /// Tokens without an `exp` claim never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }

    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.preferred_username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(payload: &serde_json::Value) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.sig",
            engine.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
            engine.encode(payload.to_string())
        )
    }

    #[test]
    fn from_jwt_decodes_keycloak_payload() {
        let token = encode(&serde_json::json!({
            "sub": "2c0b",
            "exp": 1_900_000_000,
            "preferred_username": "alice",
            "realm_access": { "roles": ["default-roles-demo", "Employee"] },
            "resource_access": {
                "quarkus-api": { "roles": ["Representative"] },
                "account": { "roles": ["manage-account"] }
            },
            "scope": "openid email profile"
        }));

        let claims = TokenClaims::from_jwt(&token).expect("decode");
        assert_eq!(claims.sub, "2c0b");
        assert!(claims.realm_roles().contains("Employee"));
        assert!(
            claims
                .resource_roles("quarkus-api")
                .expect("client roles")
                .contains("Representative")
        );
        assert!(claims.resource_roles("missing").is_none());
        assert_eq!(claims.display_name(), "alice");
    }

    #[test]
    fn from_jwt_tolerates_missing_role_claims() {
        let token = encode(&serde_json::json!({ "sub": "abc" }));
        let claims = TokenClaims::from_jwt(&token).expect("decode");
        assert!(claims.realm_roles().is_empty());
        assert!(claims.resource_access.is_empty());
    }

    #[test]
    fn from_jwt_rejects_two_segments() {
        let err = TokenClaims::from_jwt("a.b").expect_err("should fail");
        assert_eq!(err, ClaimsError::Malformed);
    }

    #[test]
    fn from_jwt_rejects_four_segments() {
        let err = TokenClaims::from_jwt("a.b.c.d").expect_err("should fail");
        assert_eq!(err, ClaimsError::Malformed);
    }

    #[test]
    fn from_jwt_rejects_bad_base64() {
        let err = TokenClaims::from_jwt("a.!!!.c").expect_err("should fail");
        assert!(matches!(err, ClaimsError::Encoding { .. }));
    }

    #[test]
    fn from_jwt_rejects_non_claims_payload() {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let token = format!("h.{}.s", engine.encode("[1,2,3]"));
        let err = TokenClaims::from_jwt(&token).expect_err("should fail");
        assert!(matches!(err, ClaimsError::Payload { .. }));
    }

    #[test]
    fn retain_client_keeps_realm_and_named_client() {
        let claims = TokenClaims::new("abc")
            .with_realm_roles(["Employee"].into_iter().collect())
            .with_resource_roles("quarkus-api", ["Representative"].into_iter().collect())
            .with_resource_roles("account", ["manage-account"].into_iter().collect())
            .retain_client("quarkus-api");

        assert!(claims.realm_roles().contains("Employee"));
        assert!(claims.resource_roles("quarkus-api").is_some());
        assert!(claims.resource_roles("account").is_none());
    }

    #[test]
    fn serialized_claims_omit_absent_fields() {
        let json = serde_json::to_value(TokenClaims::new("abc")).expect("serialize");
        assert!(json.get("exp").is_none());
        assert!(json.get("email").is_none());
        let back: TokenClaims = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, TokenClaims::new("abc"));
    }

    #[test]
    fn expiry_is_inclusive() {
        let mut claims = TokenClaims::new("abc");
        assert!(!claims.is_expired_at(i64::MAX));
        claims.exp = Some(100);
        assert!(!claims.is_expired_at(99));
        assert!(claims.is_expired_at(100));
    }

    #[test]
    fn display_name_falls_back_to_subject() {
        let claims = TokenClaims::new("abc");
        assert_eq!(claims.display_name(), "abc");

        let mut claims = claims;
        claims.email = Some("alice@example.com".to_string());
        assert_eq!(claims.display_name(), "alice@example.com");
        claims.name = Some("Alice".to_string());
        assert_eq!(claims.display_name(), "Alice");
    }
}
