//! Browser side of the identity collaborator.

use async_trait::async_trait;
use keygate_access::{IdentityConfig, IdentityProvider, InitError, InitMode, Initialized};
use leptos::prelude::ServerFnError;
use rootcause::prelude::Report;

use crate::session::fetch_session;

/// Resolves the session through the companion server's cookies.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserIdentity;

#[async_trait(?Send)]
impl IdentityProvider for BrowserIdentity {
    async fn initialize(
        &self,
        _config: &IdentityConfig,
        mode: InitMode,
    ) -> Result<Initialized, Report<InitError>> {
        let probe = fetch_session().await.map_err(init_error)?;
        Ok(mode.resolve(probe, &current_location()))
    }
}

/// Classifies a failed server function call.
///
/// Errors raised by the server itself mean the session was looked at and
/// refused. Codec and registration failures mean the browser bundle and the
/// server disagree about the server functions, which is a deployment fault.
/// Everything else never reached the server.
pub fn init_error(err: ServerFnError) -> InitError {
    match err {
        ServerFnError::ServerError(details) => InitError::Rejected { details },
        ServerFnError::Registration(details)
        | ServerFnError::Serialization(details)
        | ServerFnError::Deserialization(details)
        | ServerFnError::Args(details)
        | ServerFnError::MissingArg(details) => InitError::Misconfigured { details },
        other => InitError::Transport {
            details: other.to_string(),
        },
    }
}

/// Path, query and fragment the browser is currently at.
fn current_location() -> String {
    #[cfg(feature = "hydrate")]
    if let Some(window) = web_sys::window() {
        let location = window.location();
        return format!(
            "{}{}{}",
            location.pathname().unwrap_or_default(),
            location.search().unwrap_or_default(),
            location.hash().unwrap_or_default()
        );
    }
    keygate_access::LANDING_PATH.to_string()
}
