//! Client error types

use thiserror::Error;

/// Errors raised while constructing a client.
///
/// Per-request failures are not errors: they are classified into
/// [`crate::Outcome`] variants and counted by the caller.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
