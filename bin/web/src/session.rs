//! Server functions the browser bootstraps from.

use keygate_access::{GateSettings, SessionProbe};
use leptos::prelude::*;

/// Server function returning the deployment's gate settings.
#[server]
pub async fn fetch_settings() -> Result<GateSettings, ServerFnError> {
    use crate::auth::AppState;
    use axum::Extension;
    use std::sync::Arc;

    let Extension(state): Extension<Arc<AppState>> = leptos_axum::extract().await?;
    Ok(state.settings.clone())
}

/// Server function reporting the browser's current identity session.
#[server]
pub async fn fetch_session() -> Result<SessionProbe, ServerFnError> {
    use crate::auth::{self, AppState};
    use axum::Extension;
    use axum_extra::extract::cookie::PrivateCookieJar;
    use std::sync::Arc;

    let Extension(state): Extension<Arc<AppState>> = leptos_axum::extract().await?;
    let jar: PrivateCookieJar = leptos_axum::extract_with_state(&state.cookie_key).await?;

    auth::probe(&jar, chrono::Utc::now().timestamp()).map_err(|e| {
        tracing::warn!(error = %e, "stored access token rejected");
        ServerFnError::new(e)
    })
}
