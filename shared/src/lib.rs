//! Shared types for Kirana billing
//!
//! Invoice, store and printer profile models consumed by the tax engine
//! and the receipt printer, plus the validation error taxonomy.

pub mod error;
pub mod gstin;
pub mod models;

// Re-exports
pub use error::{ValidationError, ValidationResult};
pub use models::*;
pub use serde::{Deserialize, Serialize};
