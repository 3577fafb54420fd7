//! reqwest-backed transport.

use super::{RawResponse, Transport, TransportError};
use crate::Result;
use hyper::ext::ReasonPhrase;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

/// HTTP transport built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dailyquote/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

/// The reason phrase the server sent, falling back to the canonical one.
///
/// hyper only records the phrase when it differs from the canonical text.
fn reason_phrase(response: &reqwest::Response) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> std::result::Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        let status_text = reason_phrase(&response);

        // Error statuses are classified from the status line alone.
        let body = if status.is_success() {
            response
                .bytes()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?
                .to_vec()
        } else {
            Vec::new()
        };

        Ok(RawResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}
