//! Token issuer error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading keys or issuing tokens
#[derive(Error, Debug)]
pub enum TokenError {
    #[error(
        "Private key file not found: {path}\n\
         Make sure you have created the key files as described in the README."
    )]
    KeyFileNotFound { path: PathBuf },

    #[error("Unsupported private key format: {0}")]
    KeyFormat(String),

    #[error("Customer {0} not found")]
    UnknownCustomer(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
