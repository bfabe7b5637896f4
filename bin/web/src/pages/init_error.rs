//! Initialization error page.

use leptos::prelude::*;

/// Full-page error shown instead of the application when the identity
/// session could not be established. Retrying reloads the page.
#[component]
pub fn InitErrorPage(message: String) -> impl IntoView {
    view! {
        <div class="init-error-page">
            <h1>"We could not sign you in"</h1>
            <p class="error">{message}</p>
            <button
                type="button"
                class="retry-button"
                on:click=move |_| {
                    #[cfg(feature = "hydrate")]
                    if let Some(window) = web_sys::window() {
                        if let Err(e) = window.location().reload() {
                            tracing::error!(error = ?e, "failed to reload the page");
                        }
                    }
                }
            >"Try again"</button>
        </div>
    }
}
