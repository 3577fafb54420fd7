//! Request outcomes and the quote payload.

use serde::Deserialize;

const DEFAULT_MODEL: &str = "AI";

pub(crate) const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
pub(crate) const NETWORK_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection.";
pub(crate) const PROTOCOL_MESSAGE: &str = "Invalid response from server";
pub(crate) const CANCELLED_MESSAGE: &str = "Request cancelled.";

/// A decoded quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteResult {
    pub quote: String,
    pub personalized: bool,
    pub model: String,
}

impl QuoteResult {
    /// Who the quote is for, as shown under the quote text.
    pub fn attribution(&self, name: &str) -> String {
        if self.personalized && !name.is_empty() {
            format!("Personalized for {name}")
        } else {
            "Daily inspiration".to_string()
        }
    }

    /// Which model produced the quote.
    pub fn powered_by(&self) -> String {
        format!("Powered by {}", self.model)
    }

    /// Decode a 2xx response body.
    ///
    /// Only `quote` is required. Returns `None` for anything that is not a
    /// JSON object carrying a non-empty string `quote`.
    pub(crate) fn from_body(body: &[u8]) -> Option<Self> {
        let wire: WireQuote = serde_json::from_slice(body).ok()?;
        let quote = wire.quote.filter(|q| !q.is_empty())?;
        let model = wire
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Some(Self {
            quote,
            personalized: wire.personalized.unwrap_or(false),
            model,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireQuote {
    #[serde(default)]
    quote: Option<String>,
    #[serde(default)]
    personalized: Option<bool>,
    #[serde(default)]
    model: Option<String>,
}

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The deadline elapsed before the exchange finished.
    Timeout,
    /// No connection could be made, or it broke mid-exchange.
    NetworkError,
    /// The server answered with a non-2xx status.
    ServerError,
    /// A 2xx answer whose body was not a usable quote.
    ProtocolError,
    /// The caller abandoned the request.
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::ProtocolError => "protocol_error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The terminal result of one request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success(QuoteResult),
    Failure { kind: ErrorKind, message: String },
}

impl RequestOutcome {
    pub(crate) fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn server_error(status: u16, status_text: &str) -> Self {
        let message = if status_text.is_empty() {
            format!("Server error: {status}")
        } else {
            format!("Server error: {status} {status_text}")
        };
        Self::failure(ErrorKind::ServerError, message)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn quote(&self) -> Option<&QuoteResult> {
        match self {
            Self::Success(quote) => Some(quote),
            Self::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// The user-visible failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}
