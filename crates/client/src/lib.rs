//! Daily quote client — name validation and quote requests.
//!
//! This crate holds everything the presentation layer needs to drive a
//! personalized quote form, with no UI dependency of its own.
//!
//! # Overview
//!
//! - **QuoteController**: validates names, issues the GET request against
//!   the quote endpoint under a deadline, and maps every result to a
//!   [`RequestOutcome`].
//! - **QuoteState**: caller-owned view state (loading flag, last name, last
//!   outcome). The active [`View`] is derived from it.
//! - **Transport**: the network seam. [`HttpTransport`] uses `reqwest`.
//!
//! # Example
//!
//! ```no_run
//! use client::{QuoteController, QuoteState, RequestOutcome};
//!
//! # async fn example() -> client::Result<()> {
//! let controller = QuoteController::builder("https://quotes.example.com/quote/").build()?;
//! let mut state = QuoteState::new();
//!
//! match controller.submit(&mut state, "Ada").await {
//!     Ok(RequestOutcome::Success(quote)) => {
//!         println!("{}", quote.quote);
//!         println!("{}", quote.attribution(state.user_name()));
//!     }
//!     Ok(RequestOutcome::Failure { message, .. }) => eprintln!("{message}"),
//!     Err(invalid) => eprintln!("{invalid}"),
//! }
//! # Ok(())
//! # }
//! ```

mod controller;
mod error;
mod outcome;
mod state;
pub mod transport;
mod validate;

pub use controller::{DEFAULT_TIMEOUT, QuoteController, QuoteControllerBuilder};
pub use error::{Error, Result};
pub use outcome::{ErrorKind, QuoteResult, RequestOutcome};
pub use state::{QuoteState, View};
pub use transport::{HttpTransport, Transport};
pub use validate::{DEFAULT_MAX_LEN, DEFAULT_MIN_LEN, NameRules, ValidName, ValidationError, validate};
