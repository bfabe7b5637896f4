//! Page components for the application.
//!
//! Each page is a Leptos component rendered by the gated outlet once the
//! navigation guard lets a route through.

pub mod dashboard;
pub mod init_error;
pub mod landing;
pub mod not_found;
pub mod unauthorized;

// Re-export all page components for convenient access
pub use dashboard::{EmployeePage, RepresentativePage};
pub use init_error::InitErrorPage;
pub use landing::LandingPage;
pub use not_found::NotFoundPage;
pub use unauthorized::UnauthorizedPage;
