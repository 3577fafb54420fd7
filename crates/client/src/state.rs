//! Presentation state.

use crate::RequestOutcome;
use chrono::{DateTime, Utc};

/// Which section the presentation layer should show.
///
/// Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Input,
    Quote,
    Error,
}

/// Caller-owned state for one quote form.
///
/// The controller updates it during [`submit`](crate::QuoteController::submit)
/// and [`new_quote`](crate::QuoteController::new_quote); the caller re-renders
/// from it afterwards.
#[derive(Debug, Clone, Default)]
pub struct QuoteState {
    loading: bool,
    user_name: String,
    last_outcome: Option<RequestOutcome>,
    last_request_at: Option<DateTime<Utc>>,
}

impl QuoteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The last name accepted by validation.
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn last_outcome(&self) -> Option<&RequestOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn last_request_at(&self) -> Option<DateTime<Utc>> {
        self.last_request_at
    }

    pub fn view(&self) -> View {
        match &self.last_outcome {
            None => View::Input,
            Some(RequestOutcome::Success(_)) => View::Quote,
            Some(RequestOutcome::Failure { .. }) => View::Error,
        }
    }

    /// Go back to the input view.
    ///
    /// Ignored while loading. Returns whether the state changed.
    pub fn retry(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.last_outcome = None;
        true
    }

    pub(crate) fn set_user_name(&mut self, name: String) {
        self.user_name = name;
    }

    /// Mark a request as started and return the name to request for.
    pub(crate) fn begin(&mut self) -> String {
        self.loading = true;
        self.last_outcome = None;
        self.last_request_at = Some(Utc::now());
        self.user_name.clone()
    }

    pub(crate) fn finish(&mut self, outcome: RequestOutcome) {
        self.loading = false;
        self.last_outcome = Some(outcome);
    }
}
