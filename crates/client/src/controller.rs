//! The quote request controller.

use crate::outcome::{
    CANCELLED_MESSAGE, NETWORK_MESSAGE, PROTOCOL_MESSAGE, TIMEOUT_MESSAGE,
};
use crate::state::QuoteState;
use crate::transport::{HttpTransport, RawResponse, Transport, TransportError};
use crate::validate::{self, NameRules, ValidName, ValidationError};
use crate::{Error, ErrorKind, QuoteResult, RequestOutcome, Result};
use reqwest::Url;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Deadline applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Builder for creating a [`QuoteController`].
#[derive(Debug, Clone)]
pub struct QuoteControllerBuilder {
    endpoint: String,
    timeout: Duration,
    rules: NameRules,
    cancellation_token: Option<CancellationToken>,
}

impl QuoteControllerBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            rules: NameRules::default(),
            cancellation_token: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rules(mut self, rules: NameRules) -> Self {
        self.rules = rules;
        self
    }

    /// Abandon any in-flight request once `token` is cancelled.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build with the default HTTP transport.
    pub fn build(self) -> Result<QuoteController> {
        let transport = HttpTransport::new()?;
        self.build_with(transport)
    }

    /// Build with a caller-supplied transport.
    pub fn build_with<T: Transport>(self, transport: T) -> Result<QuoteController<T>> {
        let endpoint = parse_endpoint(&self.endpoint)?;
        Ok(QuoteController {
            transport,
            endpoint,
            timeout: self.timeout,
            rules: self.rules,
            cancellation_token: self.cancellation_token,
        })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// Validates names, fetches quotes, and classifies what went wrong.
///
/// Holds no per-request state: the view state lives in [`QuoteState`],
/// owned by the caller.
#[derive(Debug)]
pub struct QuoteController<T = HttpTransport> {
    transport: T,
    endpoint: Url,
    timeout: Duration,
    rules: NameRules,
    cancellation_token: Option<CancellationToken>,
}

impl QuoteController {
    pub fn builder(endpoint: impl Into<String>) -> QuoteControllerBuilder {
        QuoteControllerBuilder::new(endpoint)
    }
}

impl<T: Transport> QuoteController<T> {
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn rules(&self) -> &NameRules {
        &self.rules
    }

    /// Check a raw name without touching the network.
    pub fn validate(&self, raw: &str) -> std::result::Result<ValidName, ValidationError> {
        validate::validate(raw, &self.rules)
    }

    /// The URL requested for `name`. An empty name adds no query parameter.
    pub fn quote_url(&self, name: &str) -> Url {
        let mut url = self.endpoint.clone();
        if !name.is_empty() {
            url.query_pairs_mut().append_pair("name", name);
        }
        url
    }

    /// Fetch a quote using the configured deadline.
    pub async fn request_quote(&self, name: &str) -> RequestOutcome {
        self.request_quote_within(name, self.timeout).await
    }

    /// Fetch a quote, giving up after `timeout`.
    ///
    /// The network call races the deadline (and the cancellation token, if
    /// one was configured). The loser is dropped, which aborts the request,
    /// so nothing from it can land after the outcome is returned.
    pub async fn request_quote_within(&self, name: &str, timeout: Duration) -> RequestOutcome {
        let url = self.quote_url(name);
        debug!(%url, timeout_ms = timeout.as_millis() as u64, "requesting quote");

        let cancelled = async {
            match &self.cancellation_token {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = cancelled => {
                info!("quote request cancelled");
                RequestOutcome::failure(ErrorKind::Cancelled, CANCELLED_MESSAGE)
            }
            result = self.transport.get(&url) => classify(result),
            _ = tokio::time::sleep(timeout) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "quote request timed out");
                RequestOutcome::failure(ErrorKind::Timeout, TIMEOUT_MESSAGE)
            }
        };

        match &outcome {
            RequestOutcome::Success(quote) => {
                info!(model = %quote.model, personalized = quote.personalized, "quote received");
            }
            RequestOutcome::Failure { kind, message } => {
                info!(%kind, %message, "quote request failed");
            }
        }

        outcome
    }

    /// Validate `raw` and, if it passes, fetch a quote for it.
    ///
    /// On a validation failure the state is left untouched and no request
    /// is made.
    pub async fn submit(
        &self,
        state: &mut QuoteState,
        raw: &str,
    ) -> std::result::Result<RequestOutcome, ValidationError> {
        let name = self.validate(raw)?;
        state.set_user_name(name.into_inner());
        Ok(self.generate(state).await)
    }

    /// Fetch another quote for the last accepted name.
    ///
    /// Returns `None` without doing anything while a request is loading.
    pub async fn new_quote(&self, state: &mut QuoteState) -> Option<RequestOutcome> {
        if state.is_loading() {
            return None;
        }
        Some(self.generate(state).await)
    }

    async fn generate(&self, state: &mut QuoteState) -> RequestOutcome {
        let name = state.begin();
        let outcome = self.request_quote(&name).await;
        state.finish(outcome.clone());
        outcome
    }
}

fn classify(result: std::result::Result<RawResponse, TransportError>) -> RequestOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "transport failure");
            return RequestOutcome::failure(ErrorKind::NetworkError, NETWORK_MESSAGE);
        }
    };

    if !response.is_success() {
        return RequestOutcome::server_error(response.status, &response.status_text);
    }

    match QuoteResult::from_body(&response.body) {
        Some(quote) => RequestOutcome::Success(quote),
        None => {
            warn!(
                status = response.status,
                bytes = response.body.len(),
                "response carried no usable quote"
            );
            RequestOutcome::failure(ErrorKind::ProtocolError, PROTOCOL_MESSAGE)
        }
    }
}
