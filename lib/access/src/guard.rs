//! Navigation guard.
//!
//! The guard is evaluated before every route transition. It is installed
//! only after the session has resolved, so evaluation is synchronous and a
//! pure function of the target path and the session.
//!
//! Outcomes, in order of precedence:
//! 1. `/` without a dedicated landing view redirects by role precedence.
//! 2. A protected route with an unauthenticated session redirects to `/`.
//! 3. A protected route with an authenticated session holding none of the
//!    required roles redirects to `/unauthorized`.
//! 4. Anything else proceeds.

use std::sync::Arc;
use tracing::debug;

use crate::role::{Role, RoleCheck};
use crate::route::{
    EMPLOYEE_PATH, LANDING_PATH, REPRESENTATIVE_PATH, RouteDescriptor, RouteTable,
    UNAUTHORIZED_PATH, normalize_path,
};
use crate::session::Session;

/// Outcome of evaluating one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Continue to the requested path unchanged.
    Proceed,
    /// Replace the navigation with one to this path.
    Redirect(String),
}

/// Role-precedence redirect for `/` in tables without a landing view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRedirect {
    rules: Vec<(Role, String)>,
    fallback: String,
}

impl RootRedirect {
    /// Creates a redirect policy. The first rule whose role is held wins.
    #[must_use]
    pub fn new(rules: Vec<(Role, String)>, fallback: String) -> Self {
        Self { rules, fallback }
    }

    fn target(&self, session: &Session, check: &RoleCheck) -> &str {
        self.rules
            .iter()
            .find(|(role, _)| check.holds(session, role.as_str()))
            .map_or(self.fallback.as_str(), |(_, path)| path.as_str())
    }
}

impl Default for RootRedirect {
    fn default() -> Self {
        Self::new(
            vec![
                (Role::from("Representative"), REPRESENTATIVE_PATH.to_string()),
                (Role::from("Employee"), EMPLOYEE_PATH.to_string()),
            ],
            UNAUTHORIZED_PATH.to_string(),
        )
    }
}

/// Decides whether a navigation may proceed.
///
/// Cloning is cheap; the table and session are shared.
#[derive(Debug)]
pub struct NavigationGuard<V> {
    routes: Arc<RouteTable<V>>,
    session: Arc<Session>,
    role_check: RoleCheck,
    root_redirect: RootRedirect,
}

impl<V> Clone for NavigationGuard<V> {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
            session: Arc::clone(&self.session),
            role_check: self.role_check.clone(),
            root_redirect: self.root_redirect.clone(),
        }
    }
}

impl<V> NavigationGuard<V> {
    /// Creates a guard over a resolved session.
    #[must_use]
    pub fn new(routes: Arc<RouteTable<V>>, session: Arc<Session>, role_check: RoleCheck) -> Self {
        Self {
            routes,
            session,
            role_check,
            root_redirect: RootRedirect::default(),
        }
    }

    /// Replaces the role-precedence redirect used for `/`.
    #[must_use]
    pub fn with_root_redirect(mut self, root_redirect: RootRedirect) -> Self {
        self.root_redirect = root_redirect;
        self
    }

    /// Returns the session the guard consults.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the descriptor `path` renders once allowed.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteDescriptor<V>> {
        self.routes.resolve(path)
    }

    /// Evaluates a navigation from `from` (if any) to `to`.
    #[must_use]
    pub fn evaluate(&self, to: &str, from: Option<&str>) -> Navigation {
        let to = normalize_path(to);
        let outcome = match self.decide(to) {
            Navigation::Redirect(target) if normalize_path(&target) == to => Navigation::Proceed,
            outcome => outcome,
        };
        debug!(to, from, ?outcome, "navigation evaluated");
        outcome
    }

    fn decide(&self, to: &str) -> Navigation {
        if to == LANDING_PATH && !self.routes.has_landing_view() {
            let target = self.root_redirect.target(&self.session, &self.role_check);
            return Navigation::Redirect(target.to_string());
        }

        let Some(route) = self.routes.resolve(to) else {
            return Navigation::Proceed;
        };

        if !route.is_protected() {
            Navigation::Proceed
        } else if !self.session.is_authenticated() {
            Navigation::Redirect(LANDING_PATH.to_string())
        } else if !self
            .role_check
            .holds_any(&self.session, route.required_roles())
        {
            Navigation::Redirect(UNAUTHORIZED_PATH.to_string())
        } else {
            Navigation::Proceed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::TokenClaims;
    use crate::role::RoleSet;
    use crate::route::RouteDescriptor;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum View {
        Landing,
        Employee,
        Representative,
        Unauthorized,
        NotFound,
    }

    const API: &str = "quarkus-api";

    fn routes(landing: bool) -> Arc<RouteTable<View>> {
        let mut routes = Vec::new();
        if landing {
            routes.push(RouteDescriptor::new("/", View::Landing));
        }
        routes.extend([
            RouteDescriptor::new("/employee", View::Employee).requires(["Employee"]),
            RouteDescriptor::new("/representative", View::Representative)
                .requires(["Representative"]),
            RouteDescriptor::new("/unauthorized", View::Unauthorized),
            RouteDescriptor::catch_all(View::NotFound),
        ]);
        Arc::new(RouteTable::new(routes))
    }

    fn resource_session(roles: &[&str]) -> Arc<Session> {
        let claims = TokenClaims::new("abc")
            .with_resource_roles(API, roles.iter().copied().collect::<RoleSet>());
        Arc::new(Session::authenticated(claims))
    }

    fn resource_guard(landing: bool, session: Arc<Session>) -> NavigationGuard<View> {
        NavigationGuard::new(
            routes(landing),
            session,
            RoleCheck::Resource {
                client_id: API.to_string(),
            },
        )
    }

    fn redirect(path: &str) -> Navigation {
        Navigation::Redirect(path.to_string())
    }

    #[test]
    fn open_routes_always_proceed() {
        let sessions = [
            Arc::new(Session::anonymous()),
            resource_session(&[]),
            resource_session(&["Employee", "Representative"]),
        ];
        for session in sessions {
            let guard = resource_guard(true, session);
            assert_eq!(guard.evaluate("/", None), Navigation::Proceed);
            assert_eq!(guard.evaluate("/unauthorized", None), Navigation::Proceed);
            assert_eq!(guard.evaluate("/does-not-exist", None), Navigation::Proceed);
        }
    }

    #[test]
    fn unauthenticated_protected_route_goes_to_landing() {
        let guard = resource_guard(true, Arc::new(Session::anonymous()));
        assert_eq!(guard.evaluate("/employee", None), redirect("/"));
        assert_eq!(guard.evaluate("/representative", Some("/")), redirect("/"));
    }

    #[test]
    fn authenticated_without_roles_goes_to_unauthorized() {
        let guard = resource_guard(true, resource_session(&["Auditor"]));
        assert_eq!(guard.evaluate("/representative", None), redirect("/unauthorized"));
        assert_eq!(guard.evaluate("/employee", None), redirect("/unauthorized"));
    }

    #[test]
    fn authenticated_with_role_proceeds() {
        let guard = resource_guard(true, resource_session(&["Employee"]));
        assert_eq!(guard.evaluate("/employee", None), Navigation::Proceed);
        assert_eq!(guard.evaluate("/employee/", None), Navigation::Proceed);
        assert_eq!(guard.evaluate("/representative", None), redirect("/unauthorized"));
    }

    #[test]
    fn root_redirect_prefers_representative() {
        let guard = resource_guard(false, resource_session(&["Employee", "Representative"]));
        assert_eq!(guard.evaluate("/", None), redirect("/representative"));
    }

    #[test]
    fn root_redirect_employee_then_unauthorized() {
        let guard = resource_guard(false, resource_session(&["Employee"]));
        assert_eq!(guard.evaluate("/", None), redirect("/employee"));

        let guard = resource_guard(false, resource_session(&[]));
        assert_eq!(guard.evaluate("/", None), redirect("/unauthorized"));

        let guard = resource_guard(false, Arc::new(Session::anonymous()));
        assert_eq!(guard.evaluate("/", None), redirect("/unauthorized"));
    }

    #[test]
    fn root_redirect_for_resource_representative() {
        let guard = resource_guard(false, resource_session(&["Representative"]));
        assert_eq!(guard.evaluate("/", None), redirect("/representative"));
    }

    #[test]
    fn landing_view_disables_root_redirect() {
        let guard = resource_guard(true, resource_session(&["Representative"]));
        assert_eq!(guard.evaluate("/", None), Navigation::Proceed);
    }

    #[test]
    fn realm_check_reads_realm_roles_only() {
        let claims = TokenClaims::new("abc")
            .with_realm_roles(["Employee"].into_iter().collect::<RoleSet>())
            .with_resource_roles(API, ["Representative"].into_iter().collect::<RoleSet>());
        let guard = NavigationGuard::new(
            routes(true),
            Arc::new(Session::authenticated(claims)),
            RoleCheck::Realm,
        );
        assert_eq!(guard.evaluate("/employee", None), Navigation::Proceed);
        assert_eq!(guard.evaluate("/representative", None), redirect("/unauthorized"));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let guard = resource_guard(true, resource_session(&["Employee"]));
        let first = guard.evaluate("/employee", Some("/"));
        let second = guard.evaluate("/employee", Some("/employee"));
        assert_eq!(first, second);
    }

    #[test]
    fn redirect_to_current_path_is_suppressed() {
        let policy = RootRedirect::new(Vec::new(), "/".to_string());
        let guard = resource_guard(false, resource_session(&[])).with_root_redirect(policy);
        assert_eq!(guard.evaluate("/", None), Navigation::Proceed);
    }

    #[test]
    fn clones_share_session() {
        let guard = resource_guard(true, resource_session(&["Employee"]));
        let clone = guard.clone();
        assert!(std::ptr::eq(guard.session(), clone.session()));
        assert_eq!(
            clone.resolve("/employee").map(|r| *r.view()),
            Some(View::Employee)
        );
    }
}
