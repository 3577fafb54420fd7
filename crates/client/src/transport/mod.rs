//! Transport abstraction.
//!
//! The controller talks to the quote service through [`Transport`], so the
//! network can be swapped out (tests use in-memory transports).

mod http;

pub use http::HttpTransport;
pub use reqwest::Url;
use std::future::Future;
use thiserror::Error;

/// What came back over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Reason phrase from the status line, empty if none is known.
    pub status_text: String,
    /// Response body. Only read for 2xx responses.
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A failure below the HTTP layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Trait for quote transports.
///
/// Dropping the returned future must abandon the request.
pub trait Transport: Send + Sync {
    /// Issue a GET request for `url`.
    fn get(&self, url: &Url) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}
