//! Session bootstrap.
//!
//! The application performs exactly one asynchronous identity
//! initialization before any protected view is shown. Its result is a
//! [`Boot`], branched on explicitly: a ready guard over the resolved
//! session, a redirect the browser must follow to reach the provider, or a
//! terminal failure.

use async_trait::async_trait;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::claims::TokenClaims;
use crate::config::{GateSettings, IdentityConfig, InitMode};
use crate::error::InitError;
use crate::guard::NavigationGuard;
use crate::route::RouteTable;
use crate::session::Session;

/// Endpoint starting an interactive login.
pub const LOGIN_ENDPOINT: &str = "/auth/login";
/// Endpoint starting a silent (`prompt=none`) session check.
pub const SILENT_CHECK_ENDPOINT: &str = "/auth/check";

/// What the identity collaborator knows about the current browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProbe {
    /// Claims of a live session, if one exists.
    pub claims: Option<TokenClaims>,
    /// Whether a silent check already ran and found no provider session.
    #[serde(default)]
    pub silent_checked: bool,
}

/// Result of a successful initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initialized {
    /// The session is resolved.
    Session(Session),
    /// The browser must leave for this URL before a session can resolve.
    Redirect(String),
}

impl InitMode {
    /// Turns what the collaborator found into an initialization result.
    ///
    /// `return_to` is where the browser resumes once the provider is done.
    #[must_use]
    pub fn resolve(self, probe: SessionProbe, return_to: &str) -> Initialized {
        if let Some(claims) = probe.claims {
            return Initialized::Session(Session::authenticated(claims));
        }

        match self {
            Self::LoginRequired => Initialized::Redirect(endpoint_url(LOGIN_ENDPOINT, return_to)),
            Self::CheckSessionStatus if !probe.silent_checked => {
                Initialized::Redirect(endpoint_url(SILENT_CHECK_ENDPOINT, return_to))
            }
            Self::CheckSessionStatus => Initialized::Session(Session::anonymous()),
        }
    }
}

fn endpoint_url(endpoint: &str, return_to: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("{endpoint}?return_to={encoded}")
}

/// The identity collaborator.
///
/// Implementations establish the session exactly once per application
/// instance. Timeouts and retries of the provider handshake are theirs.
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Initializes the identity session.
    async fn initialize(
        &self,
        config: &IdentityConfig,
        mode: InitMode,
    ) -> Result<Initialized, Report<InitError>>;
}

/// A resolved session and the guard installed over it.
#[derive(Debug)]
pub struct GateContext<V> {
    session: Arc<Session>,
    guard: NavigationGuard<V>,
}

impl<V> Clone for GateContext<V> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            guard: self.guard.clone(),
        }
    }
}

impl<V> GateContext<V> {
    /// Returns the resolved session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the navigation guard.
    #[must_use]
    pub fn guard(&self) -> &NavigationGuard<V> {
        &self.guard
    }
}

/// Outcome of bootstrapping.
#[derive(Debug)]
pub enum Boot<V> {
    /// Mount the application with this guard.
    Ready(GateContext<V>),
    /// Follow this redirect; the application is not mounted.
    Redirecting(String),
    /// Show the initialization error; the application is not mounted.
    Failed(Report<InitError>),
}

/// Initializes the session and, on success, builds the guard over it.
#[instrument(skip_all, fields(mode = ?settings.init_mode, realm = settings.identity.realm()))]
pub async fn bootstrap<P, V>(
    provider: &P,
    settings: &GateSettings,
    routes: Arc<RouteTable<V>>,
) -> Boot<V>
where
    P: IdentityProvider + ?Sized,
{
    match provider
        .initialize(&settings.identity, settings.init_mode)
        .await
    {
        Ok(Initialized::Session(session)) => {
            info!(
                authenticated = session.is_authenticated(),
                "identity session ready"
            );
            let session = Arc::new(session);
            let guard = NavigationGuard::new(routes, Arc::clone(&session), settings.role_check());
            Boot::Ready(GateContext { session, guard })
        }
        Ok(Initialized::Redirect(url)) => {
            info!(%url, "leaving for identity provider");
            Boot::Redirecting(url)
        }
        Err(report) => {
            error!(error = %report, "identity initialization failed");
            Boot::Failed(report)
        }
    }
}
