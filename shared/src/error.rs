//! Validation errors
//!
//! Raised before any computation starts. Inputs are never silently coerced.

use thiserror::Error;

/// Input rejected by the tax engine or the receipt layout
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("quantity must be positive, got {quantity} for item '{item}'")]
    NonPositiveQuantity { item: String, quantity: f64 },

    #[error("rate must be non-negative, got {rate} for item '{item}'")]
    NegativeRate { item: String, rate: f64 },

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: String, value: f64 },

    #[error("{field} exceeds maximum allowed ({max}), got {value} for item '{item}'")]
    ExceedsMaximum {
        item: String,
        field: String,
        value: f64,
        max: f64,
    },

    #[error("discount percent must be between 0 and 100, got {percent} for item '{item}'")]
    DiscountOutOfRange { item: String, percent: f64 },

    /// Only raised when the caller asked for strict rate checking
    #[error("GST rate {rate}% is not one of 0/5/12/18/28 (item '{item}')")]
    UnsupportedGstRate { item: String, rate: f64 },

    #[error("invalid GSTIN '{tax_id}': {reason}")]
    InvalidTaxId { tax_id: String, reason: String },

    #[error("invalid state code '{0}'")]
    InvalidStateCode(String),

    #[error("printer width must be 32 or between 42 and 48 columns, got {0}")]
    InvalidPrinterWidth(usize),
}

impl ValidationError {
    pub fn invalid_tax_id(tax_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTaxId {
            tax_id: tax_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;
