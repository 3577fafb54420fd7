//! Client setup errors.
//!
//! Request failures are not errors: they come back as
//! [`RequestOutcome::Failure`](crate::RequestOutcome). These cover building
//! the controller.

use thiserror::Error;

/// Client errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The configured endpoint is not a usable URL.
    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
