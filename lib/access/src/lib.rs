//! Session bootstrap and role-gated navigation for keygate.
//!
//! This crate provides:
//! - Token claims and the resolved `Session` (realm and client role checks)
//! - Deployment configuration (`IdentityConfig`, `GateSettings`)
//! - The static route table and the `NavigationGuard`
//! - The one-shot session bootstrapper and its `IdentityProvider` seam
//!
//! It has no browser or server dependencies; the web crate supplies the
//! identity provider and renders the views.
//!
//! # Example
//!
//! ```
//! use keygate_access::{
//!     Navigation, NavigationGuard, RoleCheck, RoleSet, RouteDescriptor, RouteTable, Session,
//!     TokenClaims,
//! };
//! use std::sync::Arc;
//!
//! let routes = Arc::new(RouteTable::new(vec![
//!     RouteDescriptor::new("/employee", "employee").requires(["Employee"]),
//!     RouteDescriptor::new("/unauthorized", "unauthorized"),
//!     RouteDescriptor::catch_all("not-found"),
//! ]));
//!
//! let claims = TokenClaims::new("f3b1").with_resource_roles(
//!     "quarkus-api",
//!     ["Employee"].into_iter().collect::<RoleSet>(),
//! );
//! let guard = NavigationGuard::new(
//!     routes,
//!     Arc::new(Session::authenticated(claims)),
//!     RoleCheck::Resource { client_id: "quarkus-api".to_string() },
//! );
//!
//! assert_eq!(guard.evaluate("/employee", None), Navigation::Proceed);
//! assert_eq!(guard.evaluate("/", None), Navigation::Redirect("/employee".to_string()));
//! ```

pub mod bootstrap;
pub mod claims;
pub mod config;
pub mod error;
pub mod guard;
pub mod role;
pub mod route;
pub mod session;

// Re-export main types at crate root
pub use bootstrap::{
    Boot, GateContext, IdentityProvider, Initialized, LOGIN_ENDPOINT, SILENT_CHECK_ENDPOINT,
    SessionProbe, bootstrap,
};
pub use claims::{Access, TokenClaims};
pub use config::{GateSettings, IdentityConfig, InitMode, RoleScope};
pub use error::{ClaimsError, InitError};
pub use guard::{Navigation, NavigationGuard, RootRedirect};
pub use role::{Role, RoleCheck, RoleSet};
pub use route::{
    EMPLOYEE_PATH, LANDING_PATH, PathPattern, REPRESENTATIVE_PATH, RouteDescriptor, RouteTable,
    UNAUTHORIZED_PATH, normalize_path,
};
pub use session::Session;
