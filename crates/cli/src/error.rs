//! CLI error types.

use crate::config::ConfigError;
use client::{ErrorKind, ValidationError};
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The name was rejected before any request was made.
    #[error("invalid name: {0}")]
    InvalidName(#[from] ValidationError),

    /// The quote request finished without a quote.
    #[error("{message} ({kind})")]
    Quote { kind: ErrorKind, message: String },

    /// Configuration is invalid or unreadable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred setting up the client.
    #[error(transparent)]
    Client(#[from] client::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
