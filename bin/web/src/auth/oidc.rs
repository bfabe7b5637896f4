//! OIDC client implementation using the openidconnect crate.

use std::borrow::Cow;

use keygate_access::{ClaimsError, IdentityConfig, TokenClaims};
use openidconnect::core::{
    CoreAuthPrompt, CoreAuthenticationFlow, CoreClient, CoreProviderMetadata,
};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, OAuth2TokenResponse,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
};

use super::CALLBACK_PATH;
use crate::config::OidcConfig;

/// OIDC client for the realm's authorization-code flow.
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: Option<ClientSecret>,
    redirect_url: RedirectUrl,
    silent_redirect_url: RedirectUrl,
    identity: IdentityConfig,
    config: OidcConfig,
}

/// Data needed to complete the OIDC callback.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
    pub nonce: String,
    /// Whether the request asked the provider not to prompt.
    pub silent: bool,
    /// Where the browser resumes after the callback.
    pub return_to: String,
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the realm's provider metadata.
    pub async fn discover(identity: IdentityConfig, config: OidcConfig) -> Result<Self, OidcError> {
        let issuer_url = IssuerUrl::new(identity.issuer_url())
            .map_err(|e| OidcError::Configuration(format!("invalid issuer URL: {}", e)))?;

        let redirect_url = callback_target("redirect URI", &config.redirect_uri)?;
        let silent_redirect_url = match identity.silent_check_redirect_uri() {
            Some(uri) => callback_target("silent check redirect URI", uri)?,
            None => redirect_url.clone(),
        };

        let http_client = http_client()?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| OidcError::Discovery(format!("failed to discover provider: {}", e)))?;

        Ok(Self {
            provider_metadata,
            client_id: ClientId::new(identity.client_id().to_string()),
            client_secret: config.client_secret.clone().map(ClientSecret::new),
            redirect_url,
            silent_redirect_url,
            identity,
            config,
        })
    }

    /// Generates the authorization URL for redirecting the user.
    ///
    /// A silent request carries `prompt=none`, so the provider answers
    /// immediately with either a code or a `login_required` error.
    pub fn authorization_url(&self, silent: bool, return_to: String) -> (String, AuthState) {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .set_pkce_challenge(pkce_challenge)
            .set_redirect_uri(Cow::Borrowed(self.redirect_url_for(silent)));

        for scope in self.config.scopes() {
            auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
        }

        if silent {
            auth_request = auth_request.add_prompt(CoreAuthPrompt::None);
        }

        let (auth_url, csrf_token, nonce) = auth_request.url();

        let state = AuthState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
            nonce: nonce.secret().clone(),
            silent,
            return_to,
        };

        (auth_url.to_string(), state)
    }

    /// Exchanges the authorization code for tokens and decodes the access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        state: &AuthState,
    ) -> Result<TokenClaims, OidcError> {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let pkce_verifier = PkceCodeVerifier::new(state.pkce_verifier.clone());
        let http_client = http_client()?;

        let token_request = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| OidcError::TokenExchange(format!("token endpoint error: {}", e)))?;

        let token_response = token_request
            .set_pkce_verifier(pkce_verifier)
            .set_redirect_uri(Cow::Borrowed(self.redirect_url_for(state.silent)))
            .request_async(&http_client)
            .await
            .map_err(|e| OidcError::TokenExchange(format!("token exchange failed: {}", e)))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| OidcError::TokenExchange("no ID token in response".to_string()))?;

        let nonce = Nonce::new(state.nonce.clone());
        id_token
            .claims(&client.id_token_verifier(), &nonce)
            .map_err(|e| {
                OidcError::TokenValidation(format!("ID token validation failed: {}", e))
            })?;

        // Keycloak puts realm and client roles on the access token only.
        TokenClaims::from_jwt(token_response.access_token().secret()).map_err(OidcError::Claims)
    }

    /// Returns the provider's logout URL for this client.
    pub fn logout_url(&self) -> Result<String, OidcError> {
        let mut url = url::Url::parse(&format!(
            "{}/protocol/openid-connect/logout",
            self.identity.issuer_url()
        ))
        .map_err(|e| OidcError::Configuration(format!("invalid logout URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", self.identity.client_id());
            if let Some(uri) = &self.config.post_logout_redirect_uri {
                query.append_pair("post_logout_redirect_uri", uri);
            }
        }

        Ok(url.to_string())
    }

    fn redirect_url_for(&self, silent: bool) -> &RedirectUrl {
        if silent {
            &self.silent_redirect_url
        } else {
            &self.redirect_url
        }
    }
}

/// Parses a redirect URI the provider will send the browser back to.
///
/// Only [`CALLBACK_PATH`] is routed to the callback handler, so any other
/// path would strand the provider's answer on the not-found view.
fn callback_target(name: &str, uri: &str) -> Result<RedirectUrl, OidcError> {
    let url = RedirectUrl::new(uri.to_string())
        .map_err(|e| OidcError::Configuration(format!("invalid {}: {}", name, e)))?;

    if url.url().path() != CALLBACK_PATH {
        return Err(OidcError::Configuration(format!(
            "{} must point at {}, not {}",
            name,
            CALLBACK_PATH,
            url.url().path()
        )));
    }

    Ok(url)
}

fn http_client() -> Result<reqwest::Client, OidcError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| OidcError::Configuration(format!("failed to create HTTP client: {}", e)))
}

/// OIDC-related errors.
#[derive(Debug)]
pub enum OidcError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
    /// Failed to discover provider metadata.
    Discovery(String),
    /// Token exchange failed.
    TokenExchange(String),
    /// Token validation failed.
    TokenValidation(String),
    /// The access token could not be decoded into claims.
    Claims(ClaimsError),
}

impl std::fmt::Display for OidcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "OIDC configuration error: {}", msg),
            Self::Discovery(msg) => write!(f, "OIDC discovery error: {}", msg),
            Self::TokenExchange(msg) => write!(f, "OIDC token exchange error: {}", msg),
            Self::TokenValidation(msg) => write!(f, "OIDC token validation error: {}", msg),
            Self::Claims(err) => write!(f, "OIDC access token error: {}", err),
        }
    }
}

impl std::error::Error for OidcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_target_accepts_callback_route() {
        let url = callback_target("redirect URI", "https://app.example/auth/callback")
            .expect("callback URI");
        assert_eq!(url.url().path(), CALLBACK_PATH);
    }

    #[test]
    fn callback_target_rejects_unrouted_path() {
        let err = callback_target(
            "silent check redirect URI",
            "https://app.example/silent-check-sso.html",
        )
        .expect_err("should fail");
        assert!(
            matches!(err, OidcError::Configuration(msg) if msg.contains("/silent-check-sso.html"))
        );
    }

    #[test]
    fn callback_target_rejects_invalid_uri() {
        let err = callback_target("redirect URI", "not a url").expect_err("should fail");
        assert!(matches!(err, OidcError::Configuration(_)));
    }
}
