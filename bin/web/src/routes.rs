//! The application's route table.

use keygate_access::{
    EMPLOYEE_PATH, LANDING_PATH, REPRESENTATIVE_PATH, RouteDescriptor, RouteTable,
    UNAUTHORIZED_PATH,
};

/// Views the router can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Landing,
    Employee,
    Representative,
    Unauthorized,
    NotFound,
}

/// Builds the route table.
///
/// Without a landing view, `/` is left to the guard's role-precedence
/// redirect.
#[must_use]
pub fn route_table(landing_view: bool) -> RouteTable<Page> {
    let mut routes = Vec::with_capacity(5);
    if landing_view {
        routes.push(RouteDescriptor::new(LANDING_PATH, Page::Landing).titled("Welcome"));
    }
    routes.extend([
        RouteDescriptor::new(EMPLOYEE_PATH, Page::Employee)
            .requires(["Employee"])
            .titled("Employee dashboard"),
        RouteDescriptor::new(REPRESENTATIVE_PATH, Page::Representative)
            .requires(["Representative"])
            .titled("Representative dashboard"),
        RouteDescriptor::new(UNAUTHORIZED_PATH, Page::Unauthorized).titled("Not authorized"),
        RouteDescriptor::catch_all(Page::NotFound).titled("Page not found"),
    ]);
    RouteTable::new(routes)
}
