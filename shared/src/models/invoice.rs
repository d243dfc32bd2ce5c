//! Invoice Model

use crate::error::{ValidationError, ValidationResult};
use crate::gstin::{normalize_state_code, state_code_of, validate_gstin};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One priced line of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: f64,
    /// Unit rate, before discount and tax
    pub rate: f64,
    #[serde(default)]
    pub discount_percent: f64,
    pub gst_rate: f64,
    /// HSN/SAC classification code
    #[serde(default)]
    pub hsn_code: Option<String>,
    /// Unit label ("kg", "pcs")
    #[serde(default)]
    pub unit: Option<String>,
}

impl InvoiceLine {
    pub fn new(name: impl Into<String>, quantity: f64, rate: f64, gst_rate: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            rate,
            discount_percent: 0.0,
            gst_rate,
            hsn_code: None,
            unit: None,
        }
    }

    pub fn with_discount(mut self, percent: f64) -> Self {
        self.discount_percent = percent;
        self
    }

    pub fn with_hsn(mut self, code: impl Into<String>) -> Self {
        self.hsn_code = Some(code.into());
        self
    }
}

/// Buyer on the invoice. Walk-in customers leave everything empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Buyer GSTIN
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
}

impl Buyer {
    /// Validate the buyer GSTIN (if any) and the explicit state code (if any)
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(tax_id) = self.tax_id.as_deref().filter(|t| !t.trim().is_empty()) {
            validate_gstin(tax_id.trim())?;
        }
        if let Some(code) = self.state_code.as_deref().filter(|c| !c.trim().is_empty()) {
            normalize_state_code(code)?;
        }
        Ok(())
    }

    /// Resolve the buyer's state: explicit code first, then the GSTIN prefix
    pub fn resolved_state_code(&self) -> ValidationResult<Option<String>> {
        if let Some(code) = self.state_code.as_deref().filter(|c| !c.trim().is_empty()) {
            return normalize_state_code(code).map(Some);
        }
        match self.tax_id.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(tax_id) => {
                validate_gstin(tax_id)?;
                let code = state_code_of(tax_id).ok_or_else(|| {
                    ValidationError::invalid_tax_id(tax_id, "missing state code")
                })?;
                normalize_state_code(code).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Invoice record as handed over by the back office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    #[serde(default)]
    pub buyer: Buyer,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_from_json() {
        let json = r#"{
            "invoiceNumber": "INV-0042",
            "invoiceDate": "2024-03-15",
            "buyer": { "name": "Asha Traders", "taxId": "29AAGCB7383J1Z4" },
            "lines": [
                { "name": "Basmati Rice 5kg", "quantity": 2, "rate": 45, "gstRate": 5 },
                { "name": "Ghee 1L", "quantity": 1, "rate": 620, "discountPercent": 10, "gstRate": 12, "hsnCode": "0405" }
            ],
            "paymentMethod": "UPI"
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.invoice_number, "INV-0042");
        assert_eq!(invoice.lines.len(), 2);
        assert_eq!(invoice.lines[0].discount_percent, 0.0);
        assert_eq!(invoice.lines[1].hsn_code.as_deref(), Some("0405"));
        assert_eq!(invoice.buyer.tax_id.as_deref(), Some("29AAGCB7383J1Z4"));
    }

    #[test]
    fn test_walk_in_buyer_defaults() {
        let json = r#"{ "invoiceNumber": "1", "invoiceDate": "2024-01-01" }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.buyer, Buyer::default());
        assert!(invoice.lines.is_empty());
    }

    #[test]
    fn test_buyer_state_resolution() {
        let buyer = Buyer {
            tax_id: Some("29AAGCB7383J1Z4".into()),
            ..Default::default()
        };
        assert_eq!(buyer.resolved_state_code().unwrap().as_deref(), Some("29"));

        let buyer = Buyer {
            tax_id: Some("29AAGCB7383J1Z4".into()),
            state_code: Some("7".into()),
            ..Default::default()
        };
        assert_eq!(buyer.resolved_state_code().unwrap().as_deref(), Some("07"));

        assert_eq!(Buyer::default().resolved_state_code().unwrap(), None);
    }

    #[test]
    fn test_buyer_malformed_tax_id() {
        let buyer = Buyer {
            tax_id: Some("29AAGCB7383J1Z5".into()),
            ..Default::default()
        };
        assert!(matches!(
            buyer.validate(),
            Err(ValidationError::InvalidTaxId { .. })
        ));
        assert!(buyer.resolved_state_code().is_err());
    }
}
