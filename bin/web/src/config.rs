//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`IdentityConfig`](keygate_access::IdentityConfig) for the identity
//! provider location that is also shared with the browser.

use keygate_access::{GateSettings, IdentityConfig, InitMode, RoleScope};
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Identity provider location and client identifiers.
    pub identity: IdentityConfig,

    /// Session initialization and route gating behaviour.
    #[serde(default)]
    pub gate: GateConfig,

    /// Server-only OIDC client settings.
    pub oidc: OidcConfig,

    /// Cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Settings handed to the browser for bootstrapping.
    #[must_use]
    pub fn gate_settings(&self) -> GateSettings {
        GateSettings {
            identity: self.identity.clone(),
            init_mode: self.gate.init_mode,
            role_scope: self.gate.role_scope,
            landing_view: self.gate.landing_view,
        }
    }
}

/// Deployment choices for bootstrapping and guarding.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
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

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            init_mode: InitMode::default(),
            role_scope: RoleScope::default(),
            landing_view: default_landing_view(),
        }
    }
}

/// OIDC client settings that never leave the server.
#[derive(Debug, Clone, Deserialize)]
pub struct OidcConfig {
    /// Client secret for confidential clients. Public clients omit it.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// The callback URI registered with the provider
    /// (e.g., "https://app.example.com/auth/callback").
    pub redirect_uri: String,

    /// OAuth2 scopes to request as a comma-separated string.
    #[serde(default = "default_scopes")]
    pub scopes: String,

    /// Where the provider returns the browser after logout.
    #[serde(default)]
    pub post_logout_redirect_uri: Option<String>,
}

fn default_scopes() -> String {
    "openid,email,profile".to_string()
}

impl OidcConfig {
    /// Returns the OAuth2 scopes, parsed from the comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Cookie-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Secret for encrypting cookies, at least 64 bytes.
    /// A random key is generated per process when unset.
    #[serde(default)]
    pub cookie_secret: Option<String>,

    /// Lifetime of the silent-check marker, in seconds.
    #[serde(default = "default_silent_check_ttl_seconds")]
    pub silent_check_ttl_seconds: i64,
}

fn default_secure_cookies() -> bool {
    true
}

fn default_silent_check_ttl_seconds() -> i64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure_cookies: default_secure_cookies(),
            cookie_secret: None,
            silent_check_ttl_seconds: default_silent_check_ttl_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert!(config.secure_cookies);
        assert!(config.cookie_secret.is_none());
        assert_eq!(config.silent_check_ttl_seconds, 300);
    }

    #[test]
    fn gate_config_defaults_to_login_required_resource_scope() {
        let config = GateConfig::default();
        assert_eq!(config.init_mode, InitMode::LoginRequired);
        assert_eq!(config.role_scope, RoleScope::Resource);
        assert!(config.landing_view);
    }

    #[test]
    fn server_config_deserializes_and_builds_gate_settings() {
        let config: ServerConfig = serde_json::from_value(serde_json::json!({
            "identity": {
                "url": "https://auth.example.com",
                "realm": "demo",
                "client_id": "vue-app"
            },
            "gate": {
                "init_mode": "check-session-status",
                "role_scope": "realm",
                "landing_view": false
            },
            "oidc": {
                "redirect_uri": "http://localhost:3000/auth/callback",
                "scopes": "openid, email,,profile"
            }
        }))
        .expect("deserialize");

        assert_eq!(config.oidc.scopes(), vec!["openid", "email", "profile"]);
        assert!(config.oidc.client_secret.is_none());

        let settings = config.gate_settings();
        assert_eq!(settings.init_mode, InitMode::CheckSessionStatus);
        assert_eq!(settings.role_scope, RoleScope::Realm);
        assert!(!settings.landing_view);
        assert_eq!(settings.identity.api_client_id(), "quarkus-api");
    }
}
