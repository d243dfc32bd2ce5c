//! Store Profile Model

use crate::error::ValidationResult;
use crate::gstin::{normalize_state_code, state_code_of, validate_gstin};
use serde::{Deserialize, Serialize};

/// Seller details printed in the receipt header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProfile {
    pub legal_name: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    /// Seller GSTIN
    pub gstin: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Overrides the state code taken from the GSTIN
    #[serde(default)]
    pub state_code: Option<String>,
    /// UPI VPA for the payment QR code
    #[serde(default)]
    pub upi_id: Option<String>,
}

impl StoreProfile {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_gstin(&self.gstin)?;
        if let Some(code) = self.state_override() {
            normalize_state_code(code)?;
        }
        Ok(())
    }

    /// Seller state: explicit override, else the GSTIN prefix
    pub fn seller_state_code(&self) -> ValidationResult<String> {
        if let Some(code) = self.state_override() {
            return normalize_state_code(code);
        }
        validate_gstin(&self.gstin)?;
        normalize_state_code(state_code_of(&self.gstin).unwrap_or_default())
    }

    /// Blank overrides count as unset
    fn state_override(&self) -> Option<&str> {
        self.state_code.as_deref().filter(|c| !c.trim().is_empty())
    }
}
