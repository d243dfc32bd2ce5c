//! Billing errors

use kirana_printer::{EncodeError, TransportError};
use shared::ValidationError;
use thiserror::Error;

/// Failure anywhere between the invoice record and the printer
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BillingError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
