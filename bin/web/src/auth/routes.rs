//! Authentication routes for login, silent check, callback, and logout.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use keygate_access::{LANDING_PATH, TokenClaims};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration as TimeDuration;

use super::{
    AUTH_STATE_COOKIE, AppState, CLOCK_SKEW_SECONDS, MAX_COOKIE_BYTES, SESSION_COOKIE,
    SILENT_CHECK_COOKIE, oidc::AuthState, sealed_header_len,
};
use crate::config::SessionConfig;

/// Provider errors meaning "no session, and prompting was not allowed".
const SILENT_CHECK_MISSES: &[&str] = &[
    "login_required",
    "interaction_required",
    "consent_required",
    "account_selection_required",
];

/// Query parameters for starting a flow.
#[derive(Debug, Deserialize)]
pub struct StartQuery {
    #[serde(default)]
    return_to: Option<String>,
}

/// Query parameters for the OIDC callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    code: Option<String>,
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// Initiates an interactive login by redirecting to the identity provider.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StartQuery>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, AuthError> {
    start(&state, jar, false, query.return_to)
}

/// Asks the identity provider, without prompting, whether a session exists.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StartQuery>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, AuthError> {
    start(&state, jar, true, query.return_to)
}

fn start(
    state: &AppState,
    jar: PrivateCookieJar,
    silent: bool,
    return_to: Option<String>,
) -> Result<(PrivateCookieJar, Redirect), AuthError> {
    let return_to = safe_return_path(return_to.as_deref()).to_string();
    let (auth_url, auth_state) = state.oidc_client.authorization_url(silent, return_to);

    // Store the auth state in an encrypted cookie for validation on callback
    let auth_state_json =
        serde_json::to_string(&auth_state).map_err(|_| AuthError::InvalidAuthState)?;

    let cookie = Cookie::build((AUTH_STATE_COOKIE, auth_state_json))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    tracing::debug!(silent, "redirecting to identity provider");

    Ok((jar.add(cookie), Redirect::to(&auth_url)))
}

/// Handles the OIDC callback after the identity provider answers.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let auth_state_cookie = jar
        .get(AUTH_STATE_COOKIE)
        .ok_or(AuthError::MissingAuthState)?;

    let auth_state: AuthState =
        serde_json::from_str(auth_state_cookie.value()).map_err(|_| AuthError::InvalidAuthState)?;

    if query.state != auth_state.csrf_token {
        return Err(AuthError::CsrfMismatch);
    }

    let jar = jar.add(expired(AUTH_STATE_COOKIE));

    if let Some(error) = query.error {
        if auth_state.silent && SILENT_CHECK_MISSES.contains(&error.as_str()) {
            tracing::debug!(%error, "silent check found no provider session");
            let marker = Cookie::build((SILENT_CHECK_COOKIE, "1"))
                .path("/")
                .http_only(true)
                .secure(state.session_config.secure_cookies)
                .same_site(SameSite::Lax)
                .max_age(TimeDuration::seconds(
                    state.session_config.silent_check_ttl_seconds,
                ));
            return Ok((jar.add(marker), Redirect::to(&auth_state.return_to)));
        }
        return Err(AuthError::Provider(error));
    }

    let code = query.code.ok_or(AuthError::MissingCode)?;

    let claims = state
        .oidc_client
        .exchange_code(&code, &auth_state)
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?
        .retain_client(state.settings.identity.api_client_id());

    let cookie = session_cookie(
        &state.cookie_key,
        &state.session_config,
        &claims,
        chrono::Utc::now().timestamp(),
    )?;

    tracing::info!(subject = %claims.sub, "session established");

    let jar = jar.add(cookie).add(expired(SILENT_CHECK_COOKIE));

    Ok((jar, Redirect::to(&auth_state.return_to)))
}

/// Logs out by clearing the local session and ending the provider session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    let jar = jar
        .add(expired(SESSION_COOKIE))
        .add(expired(SILENT_CHECK_COOKIE));

    let target = match state.oidc_client.logout_url() {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to local logout");
            LANDING_PATH.to_string()
        }
    };

    (jar, Redirect::to(&target))
}

/// Builds the encrypted session cookie holding `claims`.
///
/// The cookie outlives the token by [`CLOCK_SKEW_SECONDS`] so a provider
/// clock ahead of ours does not discard a fresh session.
fn session_cookie(
    key: &Key,
    config: &SessionConfig,
    claims: &TokenClaims,
    now: i64,
) -> Result<Cookie<'static>, AuthError> {
    let value =
        serde_json::to_string(claims).map_err(|e| AuthError::SessionEncoding(e.to_string()))?;

    let mut cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax);

    if let Some(exp) = claims.exp {
        let remaining = exp + CLOCK_SKEW_SECONDS - now;
        cookie = cookie.max_age(TimeDuration::seconds(remaining.max(0)));
    }

    let cookie = cookie.build();
    let bytes = sealed_header_len(key, cookie.clone());
    if bytes > MAX_COOKIE_BYTES {
        return Err(AuthError::SessionTooLarge { bytes });
    }

    Ok(cookie)
}

fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Restricts post-login redirects to local paths.
fn safe_return_path(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => LANDING_PATH,
    }
}

/// Authentication errors.
#[derive(Debug)]
pub enum AuthError {
    MissingAuthState,
    InvalidAuthState,
    CsrfMismatch,
    MissingCode,
    Provider(String),
    TokenExchange(String),
    SessionEncoding(String),
    SessionTooLarge { bytes: usize },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingAuthState => (StatusCode::BAD_REQUEST, "Missing auth state"),
            Self::InvalidAuthState => (StatusCode::BAD_REQUEST, "Invalid auth state"),
            Self::CsrfMismatch => (StatusCode::BAD_REQUEST, "CSRF token mismatch"),
            Self::MissingCode => (StatusCode::BAD_REQUEST, "Missing authorization code"),
            Self::Provider(error) => {
                tracing::error!("Identity provider returned an error: {}", error);
                (StatusCode::BAD_GATEWAY, "Identity provider refused the login")
            }
            Self::TokenExchange(msg) => {
                tracing::error!("Token exchange failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
            Self::SessionEncoding(msg) => {
                tracing::error!("Failed to encode session: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
            Self::SessionTooLarge { bytes } => {
                tracing::error!(
                    bytes,
                    limit = MAX_COOKIE_BYTES,
                    "Session cookie exceeds browser limit"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Your account carries too many roles to sign in",
                )
            }
        };

        (status, message).into_response()
    }
}
