//! Unauthorized page component.

use leptos::prelude::*;

/// Shown when the session lacks every role a route requires.
#[component]
pub fn UnauthorizedPage() -> impl IntoView {
    view! {
        <div class="unauthorized-page">
            <h1>"Not authorized"</h1>
            <p>"Your account does not have access to that page."</p>
            <a href="/">"Back to start"</a>
            " "
            <a href="/auth/logout" rel="external">"Log in as someone else"</a>
        </div>
    }
}
