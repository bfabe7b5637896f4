//! Static route table.
//!
//! Each descriptor maps a path pattern to a view and an optional list of
//! required roles. The table is ordered and the first matching descriptor
//! wins, so a catch-all belongs at the end.

use crate::role::Role;

/// The landing path.
pub const LANDING_PATH: &str = "/";
/// The employee dashboard.
pub const EMPLOYEE_PATH: &str = "/employee";
/// The representative dashboard.
pub const REPRESENTATIVE_PATH: &str = "/representative";
/// Where sessions lacking a required role are sent.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Normalizes a location for matching.
///
/// Drops any query string or fragment and a single trailing slash. The empty
/// path is the landing path.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.is_empty() {
        LANDING_PATH
    } else if path.len() > 1 && path.ends_with('/') {
        &path[..path.len() - 1]
    } else {
        path
    }
}

/// Which locations a descriptor matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Exactly one normalized path.
    Exact(String),
    /// Every path.
    CatchAll,
}

impl PathPattern {
    /// Returns true if the normalized `path` matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => p == path,
            Self::CatchAll => true,
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor<V> {
    pattern: PathPattern,
    view: V,
    required_roles: Vec<Role>,
    title: Option<String>,
}

impl<V> RouteDescriptor<V> {
    /// Creates a descriptor for one path, open to everyone.
    #[must_use]
    pub fn new(path: &str, view: V) -> Self {
        Self {
            pattern: PathPattern::Exact(normalize_path(path).to_string()),
            view,
            required_roles: Vec::new(),
            title: None,
        }
    }

    /// Creates a descriptor matching every path.
    #[must_use]
    pub fn catch_all(view: V) -> Self {
        Self {
            pattern: PathPattern::CatchAll,
            view,
            required_roles: Vec::new(),
            title: None,
        }
    }

    /// Restricts the route to sessions holding at least one of `roles`.
    #[must_use]
    pub fn requires<R: Into<Role>>(mut self, roles: impl IntoIterator<Item = R>) -> Self {
        self.required_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the document title shown while the route is active.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the view rendered for this route.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Returns the roles of which at least one is required. Empty means open.
    #[must_use]
    pub fn required_roles(&self) -> &[Role] {
        &self.required_roles
    }

    /// Returns true if the route declares required roles.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        !self.required_roles.is_empty()
    }

    /// Returns the document title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Ordered route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable<V> {
    routes: Vec<RouteDescriptor<V>>,
}

impl<V> RouteTable<V> {
    /// Creates a table from descriptors in match order.
    #[must_use]
    pub fn new(routes: Vec<RouteDescriptor<V>>) -> Self {
        Self { routes }
    }

    /// Returns the first descriptor matching `path`.
    ///
    /// Returns `None` only when no descriptor matches and the table has no
    /// catch-all.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteDescriptor<V>> {
        let path = normalize_path(path);
        self.routes.iter().find(|r| r.pattern.matches(path))
    }

    /// Returns true if a dedicated, non-catch-all view is declared at `/`.
    #[must_use]
    pub fn has_landing_view(&self) -> bool {
        self.routes
            .iter()
            .any(|r| r.pattern == PathPattern::Exact(LANDING_PATH.to_string()))
    }
}
