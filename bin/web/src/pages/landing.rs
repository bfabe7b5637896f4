//! Landing page component.

use leptos::prelude::*;

/// The landing page, open to everyone.
#[component]
pub fn LandingPage(
    /// Display name of the signed-in user, if any.
    user: Option<String>,
) -> impl IntoView {
    view! {
        <div class="landing-page">
            {match user {
                Some(name) => view! {
                    <div>
                        <h1>{format!("Welcome, {}!", name)}</h1>
                        <p>"Choose your workspace."</p>
                        <nav class="dashboards">
                            <a href="/employee" class="cta-button">"Employee dashboard"</a>
                            <a href="/representative" class="cta-button">"Representative dashboard"</a>
                        </nav>
                    </div>
                }.into_any(),
                None => view! {
                    <div>
                        <h1>"keygate"</h1>
                        <p>"Please log in to reach your dashboard."</p>
                        <a href="/auth/login?return_to=%2F" rel="external" class="cta-button">"Log in"</a>
                    </div>
                }.into_any(),
            }}
        </div>
    }
}
