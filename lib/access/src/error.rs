//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ClaimsError`: Failures decoding a token payload into claims
//! - `InitError`: Identity session initialization failures
//!
//! Authorization failures are deliberately absent. A session lacking a
//! required role is an expected outcome and is expressed as a
//! [`Navigation::Redirect`](crate::guard::Navigation::Redirect), never as an error.

use std::fmt;

/// Errors from decoding an access token into [`TokenClaims`](crate::claims::TokenClaims).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    /// The token is not a three-part compact JWT.
    Malformed,
    /// The payload segment is not valid base64url.
    Encoding { reason: String },
    /// The payload is not a JSON claims object.
    Payload { reason: String },
}

impl fmt::Display for ClaimsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => {
                write!(f, "token is not a compact JWT")
            }
            Self::Encoding { reason } => {
                write!(f, "token payload is not base64url: {reason}")
            }
            Self::Payload { reason } => {
                write!(f, "token payload is not a claims object: {reason}")
            }
        }
    }
}

impl std::error::Error for ClaimsError {}

/// Errors from initializing the identity session.
///
/// Every variant is terminal for the running application instance. The
/// bootstrapper surfaces it to the user and never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// The identity collaborator could not be reached.
    Transport { details: String },
    /// The deployment is unusable (browser and server disagree, bad settings).
    Misconfigured { details: String },
    /// The provider or token exchange rejected the session.
    Rejected { details: String },
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { details } => {
                write!(f, "identity provider unreachable: {details}")
            }
            Self::Misconfigured { details } => {
                write!(f, "identity configuration invalid: {details}")
            }
            Self::Rejected { details } => {
                write!(f, "identity session rejected: {details}")
            }
        }
    }
}

impl std::error::Error for InitError {}
