//! Main Leptos application component and routing.
//!
//! The identity session is bootstrapped once, when `App` is created. Until
//! it settles nothing but a loading indicator renders. Afterwards every
//! route change passes through the navigation guard, which either lets the
//! route's view render or replaces the navigation.

use keygate_access::{
    Boot, GateContext, GateSettings, IdentityProvider, Navigation, Session, bootstrap,
};
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    NavigateOptions,
    components::{Redirect, Route, Router, Routes},
    hooks::use_location,
    path,
};
use std::sync::Arc;

use crate::identity::{BrowserIdentity, init_error};
use crate::pages::{
    EmployeePage, InitErrorPage, LandingPage, NotFoundPage, RepresentativePage, UnauthorizedPage,
};
use crate::routes::{Page, route_table};
use crate::session::fetch_settings;

/// Where bootstrapping left the application.
#[derive(Clone, Debug)]
pub enum Phase {
    /// Session resolved and guard installed.
    Ready(GateContext<Page>),
    /// The browser is leaving for the identity provider.
    Redirecting(String),
    /// Initialization failed; the application stays unmounted.
    Failed(String),
}

/// Runs the one-shot bootstrap against the companion server.
pub async fn boot_application() -> Phase {
    settle(fetch_settings().await, &BrowserIdentity).await
}

/// Bootstraps against `provider` once the gate settings have loaded.
pub async fn settle<P: IdentityProvider + ?Sized>(
    settings: Result<GateSettings, ServerFnError>,
    provider: &P,
) -> Phase {
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            let err = init_error(e);
            tracing::error!(error = %err, "failed to load gate settings");
            return Phase::Failed(err.to_string());
        }
    };

    let routes = Arc::new(route_table(settings.landing_view));
    match bootstrap(provider, &settings, routes).await {
        Boot::Ready(ctx) => Phase::Ready(ctx),
        Boot::Redirecting(url) => Phase::Redirecting(url),
        Boot::Failed(report) => Phase::Failed(report.to_string()),
    }
}

/// What the gated outlet shows at one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outlet {
    /// Render `page`, setting the document title when one is declared.
    Render { page: Page, title: Option<String> },
    /// Replace the current history entry with a navigation to this path.
    Replace(String),
}

/// Asks the guard what to show when navigating from `from` to `to`.
#[must_use]
pub fn outlet(gate: &GateContext<Page>, to: &str, from: Option<&str>) -> Outlet {
    let guard = gate.guard();
    match guard.evaluate(to, from) {
        Navigation::Proceed => {
            let route = guard.resolve(to);
            Outlet::Render {
                page: route.map_or(Page::NotFound, |r| *r.view()),
                title: route.and_then(|r| r.title()).map(str::to_string),
            }
        }
        Navigation::Redirect(target) => Outlet::Replace(target),
    }
}

/// Guard redirects replace the denied entry so "back" does not return to it.
fn replacing() -> NavigateOptions {
    NavigateOptions {
        replace: true,
        ..Default::default()
    }
}

/// The main application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let boot = LocalResource::new(boot_application);
    provide_context(boot);

    view! {
        <Title text="keygate"/>
        <Router>
            <main class="container">
                <Routes fallback=|| view! { <NotFoundPage/> }>
                    <Route path=path!("/") view=GatedOutlet/>
                    <Route path=path!("/*any") view=GatedOutlet/>
                </Routes>
            </main>
        </Router>
    }
}

/// Waits for the bootstrap, then renders whatever it settled on.
#[component]
fn GatedOutlet() -> impl IntoView {
    let boot = expect_context::<LocalResource<Phase>>();

    view! {
        <Suspense fallback=move || view! { <p class="loading">"Signing in..."</p> }>
            {move || Suspend::new(async move {
                match boot.await {
                    Phase::Ready(gate) => view! { <GatedView gate=gate/> }.into_any(),
                    Phase::Redirecting(url) => view! { <LeavingForLogin url=url/> }.into_any(),
                    Phase::Failed(message) => view! { <InitErrorPage message=message/> }.into_any(),
                }
            })}
        </Suspense>
    }
}

/// Evaluates the guard on every location change.
#[component]
fn GatedView(gate: GateContext<Page>) -> impl IntoView {
    let location = use_location();
    let previous = StoredValue::new(None::<String>);

    move || {
        let to = location.pathname.get();
        let from = previous.get_value();

        match outlet(&gate, &to, from.as_deref()) {
            Outlet::Render { page, title } => {
                previous.set_value(Some(to));
                view! {
                    {title.map(|text| view! { <Title text=text/> })}
                    {render_page(page, gate.session())}
                }
                .into_any()
            }
            Outlet::Replace(target) => view! { <Redirect path=target options=replacing()/> }
                .into_any(),
        }
    }
}

fn render_page(page: Page, session: &Session) -> AnyView {
    let user = session.claims().map(|c| c.display_name().to_string());
    match page {
        Page::Landing => view! { <LandingPage user=user/> }.into_any(),
        Page::Employee => {
            view! { <EmployeePage user=user.unwrap_or_default()/> }.into_any()
        }
        Page::Representative => {
            view! { <RepresentativePage user=user.unwrap_or_default()/> }.into_any()
        }
        Page::Unauthorized => view! { <UnauthorizedPage/> }.into_any(),
        Page::NotFound => view! { <NotFoundPage/> }.into_any(),
    }
}

/// Sends the browser to the identity provider.
#[component]
fn LeavingForLogin(url: String) -> impl IntoView {
    Effect::new(move || {
        #[cfg(feature = "hydrate")]
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(&url) {
                tracing::error!(error = ?e, %url, "failed to leave for the identity provider");
            }
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = &url;
    });

    view! { <p class="loading">"Redirecting to sign in..."</p> }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use keygate_access::{
        IdentityConfig, InitError, InitMode, Initialized, RoleSet, TokenClaims,
    };
    use rootcause::prelude::Report;

    struct StubIdentity(Result<Initialized, InitError>);

    #[async_trait(?Send)]
    impl IdentityProvider for StubIdentity {
        async fn initialize(
            &self,
            _config: &IdentityConfig,
            _mode: InitMode,
        ) -> Result<Initialized, Report<InitError>> {
            self.0.clone().map_err(Report::from)
        }
    }

    fn settings() -> GateSettings {
        GateSettings::new(IdentityConfig::new(
            "https://sso.example".to_string(),
            "demo".to_string(),
            "web".to_string(),
        ))
    }

    fn employee() -> Initialized {
        Initialized::Session(Session::authenticated(
            TokenClaims::new("abc")
                .with_resource_roles("quarkus-api", ["Employee"].into_iter().collect::<RoleSet>()),
        ))
    }

    async fn ready_gate(initialized: Initialized) -> GateContext<Page> {
        match settle(Ok(settings()), &StubIdentity(Ok(initialized))).await {
            Phase::Ready(gate) => gate,
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_settings_fail_before_bootstrap() {
        let provider = StubIdentity(Ok(employee()));
        let phase = settle(
            Err(ServerFnError::Request("connection refused".to_string())),
            &provider,
        )
        .await;
        assert!(matches!(phase, Phase::Failed(message) if message.contains("unreachable")));
    }

    #[tokio::test]
    async fn rejected_identity_never_mounts() {
        let provider = StubIdentity(Err(InitError::Rejected {
            details: "token revoked".to_string(),
        }));
        let phase = settle(Ok(settings()), &provider).await;
        assert!(matches!(phase, Phase::Failed(_)));
    }

    #[tokio::test]
    async fn provider_redirect_leaves_for_login() {
        let provider = StubIdentity(Ok(Initialized::Redirect(
            "/auth/login?return_to=%2F".to_string(),
        )));
        let phase = settle(Ok(settings()), &provider).await;
        assert!(matches!(phase, Phase::Redirecting(url) if url.starts_with("/auth/login")));
    }

    #[tokio::test]
    async fn ready_gate_renders_permitted_route_with_title() {
        let gate = ready_gate(employee()).await;
        assert_eq!(
            outlet(&gate, "/employee", Some("/")),
            Outlet::Render {
                page: Page::Employee,
                title: Some("Employee dashboard".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn denied_route_is_replaced() {
        let gate = ready_gate(employee()).await;
        assert_eq!(
            outlet(&gate, "/representative", Some("/employee")),
            Outlet::Replace("/unauthorized".to_string())
        );

        let anonymous = ready_gate(Initialized::Session(Session::anonymous())).await;
        assert_eq!(
            outlet(&anonymous, "/employee", None),
            Outlet::Replace("/".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_route_renders_not_found() {
        let gate = ready_gate(employee()).await;
        assert!(matches!(
            outlet(&gate, "/nowhere", None),
            Outlet::Render {
                page: Page::NotFound,
                ..
            }
        ));
    }

    #[test]
    fn guard_redirects_replace_history() {
        assert!(replacing().replace);
    }
}
