//! Identity provider and gate configuration.
//!
//! These types describe a deployment: where the identity provider lives,
//! how the session is initialized, and which role scope the guard consults.
//! They carry no secrets and can be handed to the browser as-is.

use serde::{Deserialize, Serialize};

use crate::role::RoleCheck;

/// Location of the identity provider and the client identifiers in use.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Provider base URL (e.g., "https://auth.example.com").
    url: String,
    /// Realm name.
    realm: String,
    /// Client identifier of this application.
    client_id: String,
    /// Client whose roles gate the routes in resource-scoped deployments.
    /// Default: "quarkus-api"
    #[serde(default = "default_api_client_id")]
    api_client_id: String,
    /// Where the provider sends the browser after a silent session check.
    /// Falls back to the regular callback when unset.
    #[serde(default)]
    silent_check_redirect_uri: Option<String>,
}

fn default_api_client_id() -> String {
    "quarkus-api".to_string()
}

impl IdentityConfig {
    /// Creates a configuration with defaults for optional fields.
    #[must_use]
    pub fn new(url: String, realm: String, client_id: String) -> Self {
        Self {
            url,
            realm,
            client_id,
            api_client_id: default_api_client_id(),
            silent_check_redirect_uri: None,
        }
    }

    /// Overrides the API client whose roles are checked.
    #[must_use]
    pub fn with_api_client_id(mut self, api_client_id: String) -> Self {
        self.api_client_id = api_client_id;
        self
    }

    /// Sets the silent-check redirect target.
    #[must_use]
    pub fn with_silent_check_redirect_uri(mut self, uri: Option<String>) -> Self {
        self.silent_check_redirect_uri = uri;
        self
    }

    /// Returns the provider base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the realm name.
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Returns this application's client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the API client identifier.
    #[must_use]
    pub fn api_client_id(&self) -> &str {
        &self.api_client_id
    }

    /// Returns the silent-check redirect target, if configured.
    #[must_use]
    pub fn silent_check_redirect_uri(&self) -> Option<&str> {
        self.silent_check_redirect_uri.as_deref()
    }

    /// Returns the OIDC issuer URL of the realm, used for discovery.
    #[must_use]
    pub fn issuer_url(&self) -> String {
        format!("{}/realms/{}", self.url.trim_end_matches('/'), self.realm)
    }
}

/// How the identity session is initialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitMode {
    /// Force a login before the application continues.
    #[default]
    LoginRequired,
    /// Detect an existing provider session without forcing a login.
    CheckSessionStatus,
}

/// Which role scope the guard consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleScope {
    /// Realm roles.
    Realm,
    /// Roles on the configured API client.
    #[default]
    Resource,
}

/// Everything the browser needs to bootstrap and gate the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSettings {
    pub identity: IdentityConfig,
    #[serde(default)]
    pub init_mode: InitMode,
    #[serde(default)]
    pub role_scope: RoleScope,
    /// Render a landing view at `/` instead of redirecting by role.
    #[serde(default = "default_landing_view")]
    pub landing_view: bool,
}

fn default_landing_view() -> bool {
    true
}

impl GateSettings {
    /// Creates settings with default mode, scope and landing view.
    #[must_use]
    pub fn new(identity: IdentityConfig) -> Self {
        Self {
            identity,
            init_mode: InitMode::default(),
            role_scope: RoleScope::default(),
            landing_view: default_landing_view(),
        }
    }

    /// Resolves the configured scope into the guard's role check.
    #[must_use]
    pub fn role_check(&self) -> RoleCheck {
        match self.role_scope {
            RoleScope::Realm => RoleCheck::Realm,
            RoleScope::Resource => RoleCheck::Resource {
                client_id: self.identity.api_client_id().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> IdentityConfig {
        IdentityConfig::new(
            "https://auth.example.com/".to_string(),
            "demo".to_string(),
            "vue-app".to_string(),
        )
    }

    #[test]
    fn new_config_has_defaults() {
        let config = identity();
        assert_eq!(config.realm(), "demo");
        assert_eq!(config.client_id(), "vue-app");
        assert_eq!(config.api_client_id(), "quarkus-api");
        assert!(config.silent_check_redirect_uri().is_none());
    }

    #[test]
    fn issuer_url_joins_realm() {
        assert_eq!(
            identity().issuer_url(),
            "https://auth.example.com/realms/demo"
        );
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let json = r#"{
            "identity": {
                "url": "https://auth.example.com",
                "realm": "demo",
                "client_id": "vue-app"
            }
        }"#;

        let settings: GateSettings = serde_json::from_str(json).expect("deserialize");
        assert_eq!(settings.init_mode, InitMode::LoginRequired);
        assert_eq!(settings.role_scope, RoleScope::Resource);
        assert!(settings.landing_view);
        assert_eq!(settings.identity.api_client_id(), "quarkus-api");
    }

    #[test]
    fn init_mode_serialization_format() {
        let json = serde_json::to_string(&InitMode::CheckSessionStatus).expect("serialize");
        assert_eq!(json, "\"check-session-status\"");
        let mode: InitMode = serde_json::from_str("\"login-required\"").expect("parse");
        assert_eq!(mode, InitMode::LoginRequired);
    }

    #[test]
    fn role_check_follows_scope() {
        let mut settings =
            GateSettings::new(identity().with_api_client_id("orders-api".to_string()));
        assert_eq!(
            settings.role_check(),
            RoleCheck::Resource {
                client_id: "orders-api".to_string()
            }
        );

        settings.role_scope = RoleScope::Realm;
        assert_eq!(settings.role_check(), RoleCheck::Realm);
    }
}
