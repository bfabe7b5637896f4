//! Identity collaborator for the keygate browser application.
//!
//! This module provides:
//! - OIDC authorization-code login against the configured realm
//! - Silent (`prompt=none`) session checks
//! - Encrypted cookie storage of the access token's claims
//!
//! The browser never sees the token itself. It asks for a
//! [`SessionProbe`] through a server function and receives the decoded
//! claims, from which the guard derives roles.

pub mod oidc;
pub mod routes;

use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar};
use keygate_access::{ClaimsError, GateSettings, SessionProbe, TokenClaims};

use crate::config::SessionConfig;

pub use oidc::OidcClient;
pub use routes::{callback, check, login, logout};

/// Route the provider redirects back to, for both interactive and silent flows.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Session cookie name; holds the access token's claims as JSON.
pub(crate) const SESSION_COOKIE: &str = "session";

/// Auth state cookie name (for CSRF protection during OIDC flow).
pub(crate) const AUTH_STATE_COOKIE: &str = "auth_state";

/// Marks that a silent check found no provider session.
pub(crate) const SILENT_CHECK_COOKIE: &str = "silent_checked";

/// Tolerated drift between this server's clock and the provider's, in seconds.
pub(crate) const CLOCK_SKEW_SECONDS: i64 = 30;

/// Largest `Set-Cookie` header browsers reliably keep.
pub(crate) const MAX_COOKIE_BYTES: usize = 4096;

/// Shared application state.
pub struct AppState {
    /// OIDC client for authentication.
    pub oidc_client: OidcClient,
    /// Settings handed to the browser.
    pub settings: GateSettings,
    /// Cookie configuration.
    pub session_config: SessionConfig,
    /// Key encrypting the private cookies.
    pub cookie_key: Key,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        oidc_client: OidcClient,
        settings: GateSettings,
        session_config: SessionConfig,
        cookie_key: Key,
    ) -> Self {
        Self {
            oidc_client,
            settings,
            session_config,
            cookie_key,
        }
    }
}

/// Reads what the cookies say about the browser's session.
///
/// An expired token counts as no session; renewing it is a fresh login.
/// Expiry allows [`CLOCK_SKEW_SECONDS`] of drift.
///
/// # Errors
///
/// Returns an error if the stored claims cannot be decoded.
pub fn probe(jar: &PrivateCookieJar, now: i64) -> Result<SessionProbe, ClaimsError> {
    let claims = match jar.get(SESSION_COOKIE) {
        Some(cookie) => Some(
            serde_json::from_str::<TokenClaims>(cookie.value()).map_err(|e| {
                ClaimsError::Payload {
                    reason: e.to_string(),
                }
            })?,
        ),
        None => None,
    };

    Ok(SessionProbe {
        claims: claims.filter(|c| !c.is_expired_at(now - CLOCK_SKEW_SECONDS)),
        silent_checked: jar.get(SILENT_CHECK_COOKIE).is_some(),
    })
}

/// Length of the `Set-Cookie` header `cookie` produces once sealed with `key`.
pub(crate) fn sealed_header_len(key: &Key, cookie: Cookie<'static>) -> usize {
    let response = PrivateCookieJar::new(key.clone())
        .add(cookie)
        .into_response();
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.len())
        .max()
        .unwrap_or(0)
}
