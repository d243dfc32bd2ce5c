//! Tax Calculator
//!
//! Turns one invoice line into its GST breakdown.
//! Uses rust_decimal for precise calculations, stores as f64.

use crate::money::{round_paise, to_decimal, to_f64};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{
    Buyer, InvoiceLine, StoreProfile, ValidationError, ValidationResult, gstin::normalize_state_code,
    is_standard_gst_rate,
};
use tracing::warn;

/// Maximum unit rate per line (one crore)
pub const MAX_RATE: f64 = 10_000_000.0;
/// Maximum quantity per line
pub const MAX_QUANTITY: f64 = 1_000_000.0;
/// Maximum GST rate, in percent
pub const MAX_GST_RATE: f64 = 100.0;

/// Jurisdiction of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxContext {
    /// Seller and buyer are in the same state: CGST + SGST, else IGST
    pub is_intrastate: bool,
    /// Reject rates outside 0/5/12/18/28 instead of flagging them
    #[serde(default)]
    pub strict_rates: bool,
}

impl TaxContext {
    pub fn intrastate() -> Self {
        Self {
            is_intrastate: true,
            strict_rates: false,
        }
    }

    pub fn interstate() -> Self {
        Self {
            is_intrastate: false,
            strict_rates: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_rates = strict;
        self
    }

    /// Compare state codes; a buyer without a state is treated as local
    pub fn derive(seller_state: &str, buyer_state: Option<&str>) -> ValidationResult<Self> {
        let seller = normalize_state_code(seller_state)?;
        let is_intrastate = match buyer_state {
            Some(buyer) => normalize_state_code(buyer)? == seller,
            None => true,
        };
        Ok(Self {
            is_intrastate,
            strict_rates: false,
        })
    }

    /// Resolve both states from the store profile and the buyer record
    pub fn for_invoice(store: &StoreProfile, buyer: &Buyer) -> ValidationResult<Self> {
        let seller = store.seller_state_code()?;
        let buyer_state = buyer.resolved_state_code()?;
        Self::derive(&seller, buyer_state.as_deref())
    }
}

impl Default for TaxContext {
    fn default() -> Self {
        Self::intrastate()
    }
}

/// GST split of one line (or of a whole invoice once summed)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// quantity × rate
    pub gross: f64,
    pub discount: f64,
    /// gross − discount
    pub taxable: f64,
    pub gst_rate: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    /// Rate is outside the fixed slab set
    #[serde(default)]
    pub nonstandard_rate: bool,
}

impl TaxBreakdown {
    /// cgst + sgst + igst
    pub fn gst_amount(&self) -> f64 {
        to_f64(to_decimal(self.cgst) + to_decimal(self.sgst) + to_decimal(self.igst))
    }

    /// taxable + gst
    pub fn line_total(&self) -> f64 {
        to_f64(to_decimal(self.taxable) + to_decimal(self.gst_amount()))
    }

    /// Same line rounded to paise
    ///
    /// For intrastate lines the half is rounded once and used for both CGST
    /// and SGST, so the two always match on the printed invoice.
    pub fn rounded(&self) -> Self {
        let gross = round_paise(to_decimal(self.gross));
        let taxable = round_paise(to_decimal(self.taxable));
        Self {
            gross: to_f64(gross),
            discount: to_f64(gross - taxable),
            taxable: to_f64(taxable),
            gst_rate: self.gst_rate,
            cgst: to_f64(round_paise(to_decimal(self.cgst))),
            sgst: to_f64(round_paise(to_decimal(self.cgst))),
            igst: to_f64(round_paise(to_decimal(self.igst))),
            nonstandard_rate: self.nonstandard_rate,
        }
    }
}

#[inline]
fn require_at_most(item: &str, field: &str, value: f64, max: f64) -> ValidationResult<()> {
    if value > max {
        return Err(ValidationError::ExceedsMaximum {
            item: item.to_string(),
            field: field.to_string(),
            value,
            max,
        });
    }
    Ok(())
}

#[inline]
fn require_finite(value: f64, field: &str) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Validate a line before pricing it
///
/// The bounds keep `quantity × rate × gst_rate` below 1e16, so neither the
/// per-line products nor any realistic invoice sum can leave the Decimal
/// range.
///
/// Returns whether the GST rate is outside the slab set. In strict mode such
/// a rate is an error instead.
pub fn validate_line(line: &InvoiceLine, ctx: &TaxContext) -> ValidationResult<bool> {
    require_finite(line.quantity, "quantity")?;
    require_finite(line.rate, "rate")?;
    require_finite(line.discount_percent, "discount_percent")?;
    require_finite(line.gst_rate, "gst_rate")?;

    if line.quantity <= 0.0 {
        return Err(ValidationError::NonPositiveQuantity {
            item: line.name.clone(),
            quantity: line.quantity,
        });
    }
    if line.rate < 0.0 {
        return Err(ValidationError::NegativeRate {
            item: line.name.clone(),
            rate: line.rate,
        });
    }
    require_at_most(&line.name, "quantity", line.quantity, MAX_QUANTITY)?;
    require_at_most(&line.name, "rate", line.rate, MAX_RATE)?;
    require_at_most(&line.name, "gst_rate", line.gst_rate, MAX_GST_RATE)?;
    if !(0.0..=100.0).contains(&line.discount_percent) {
        return Err(ValidationError::DiscountOutOfRange {
            item: line.name.clone(),
            percent: line.discount_percent,
        });
    }

    let nonstandard = !is_standard_gst_rate(line.gst_rate);
    if nonstandard && (ctx.strict_rates || line.gst_rate < 0.0) {
        return Err(ValidationError::UnsupportedGstRate {
            item: line.name.clone(),
            rate: line.gst_rate,
        });
    }
    Ok(nonstandard)
}

/// Compute the GST breakdown of one line
///
/// Discount is applied before tax:
/// `taxable = quantity × rate × (1 − discount/100)`, `gst = taxable × gst_rate/100`.
/// Amounts are exact; rounding to paise happens in the aggregator.
pub fn compute_line_tax(line: &InvoiceLine, ctx: &TaxContext) -> ValidationResult<TaxBreakdown> {
    let nonstandard_rate = validate_line(line, ctx)?;
    if nonstandard_rate {
        warn!(item = %line.name, gst_rate = line.gst_rate, "Non-standard GST rate accepted");
    }

    let hundred = Decimal::ONE_HUNDRED;
    let gross = to_decimal(line.quantity) * to_decimal(line.rate);
    let taxable = gross * (Decimal::ONE - to_decimal(line.discount_percent) / hundred);
    let gst = taxable * to_decimal(line.gst_rate) / hundred;

    let (cgst, sgst, igst) = if ctx.is_intrastate {
        let half = gst / Decimal::TWO;
        (half, half, Decimal::ZERO)
    } else {
        (Decimal::ZERO, Decimal::ZERO, gst)
    };

    Ok(TaxBreakdown {
        gross: to_f64(gross),
        discount: to_f64(gross - taxable),
        taxable: to_f64(taxable),
        gst_rate: line.gst_rate,
        cgst: to_f64(cgst),
        sgst: to_f64(sgst),
        igst: to_f64(igst),
        nonstandard_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_intrastate_scenario() {
        let line = InvoiceLine::new("Rice", 2.0, 45.0, 5.0);
        let tax = compute_line_tax(&line, &TaxContext::intrastate()).unwrap();

        assert_eq!(tax.taxable, 90.0);
        assert_eq!(tax.gst_amount(), 4.5);
        assert_eq!(tax.cgst, 2.25);
        assert_eq!(tax.sgst, 2.25);
        assert_eq!(tax.igst, 0.0);
        assert!(!tax.nonstandard_rate);
    }

    #[test]
    fn test_interstate_scenario() {
        let line = InvoiceLine::new("Mixer", 1.0, 1000.0, 18.0).with_discount(10.0);
        let tax = compute_line_tax(&line, &TaxContext::interstate()).unwrap();

        assert_eq!(tax.gross, 1000.0);
        assert_eq!(tax.discount, 100.0);
        assert_eq!(tax.taxable, 900.0);
        assert_eq!(tax.igst, 162.0);
        assert_eq!(tax.cgst, 0.0);
        assert_eq!(tax.sgst, 0.0);
        assert_eq!(tax.line_total(), 1062.0);
    }

    #[test]
    fn test_split_invariant_over_many_lines() {
        let quantities = [0.25, 1.0, 3.0, 7.5, 12.0];
        let rates = [0.0, 9.99, 33.33, 45.0, 1234.5];
        let discounts = [0.0, 2.5, 10.0, 33.0, 100.0];

        for &q in &quantities {
            for &r in &rates {
                for &d in &discounts {
                    for &g in &shared::GST_RATES {
                        let line = InvoiceLine::new("x", q, r, g).with_discount(d);
                        for ctx in [TaxContext::intrastate(), TaxContext::interstate()] {
                            let tax = compute_line_tax(&line, &ctx).unwrap();
                            let expected = tax.taxable * g / 100.0;
                            assert!((tax.gst_amount() - expected).abs() < EPSILON);

                            if ctx.is_intrastate {
                                assert_eq!(tax.igst, 0.0);
                                assert_eq!(tax.cgst, tax.sgst);
                            } else {
                                assert_eq!(tax.cgst, 0.0);
                                assert_eq!(tax.sgst, 0.0);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_rejects_bad_quantity_and_rate() {
        let ctx = TaxContext::intrastate();
        assert!(matches!(
            compute_line_tax(&InvoiceLine::new("x", 0.0, 10.0, 5.0), &ctx),
            Err(ValidationError::NonPositiveQuantity { .. })
        ));
        assert!(matches!(
            compute_line_tax(&InvoiceLine::new("x", -1.0, 10.0, 5.0), &ctx),
            Err(ValidationError::NonPositiveQuantity { .. })
        ));
        assert!(matches!(
            compute_line_tax(&InvoiceLine::new("x", 1.0, -0.01, 5.0), &ctx),
            Err(ValidationError::NegativeRate { .. })
        ));
        assert!(matches!(
            compute_line_tax(&InvoiceLine::new("x", f64::NAN, 1.0, 5.0), &ctx),
            Err(ValidationError::NonFinite { .. })
        ));
        assert!(matches!(
            compute_line_tax(&InvoiceLine::new("x", 1.0, 1.0, 5.0).with_discount(120.0), &ctx),
            Err(ValidationError::DiscountOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_amounts_beyond_bounds() {
        let ctx = TaxContext::intrastate();
        assert!(matches!(
            compute_line_tax(&InvoiceLine::new("bulk", 1e15, 1e15, 5.0), &ctx),
            Err(ValidationError::ExceedsMaximum { ref field, .. }) if field == "quantity"
        ));
        assert!(matches!(
            compute_line_tax(&InvoiceLine::new("bulk", 1.0, 1e29, 5.0), &ctx),
            Err(ValidationError::ExceedsMaximum { ref field, .. }) if field == "rate"
        ));
        assert!(matches!(
            compute_line_tax(&InvoiceLine::new("bulk", 1.0, 10.0, 250.0), &ctx),
            Err(ValidationError::ExceedsMaximum { ref field, .. }) if field == "gst_rate"
        ));
    }

    #[test]
    fn test_largest_line_is_exact() {
        let line = InvoiceLine::new("bulk", MAX_QUANTITY, MAX_RATE, 28.0);
        let tax = compute_line_tax(&line, &TaxContext::interstate()).unwrap();
        assert_eq!(tax.taxable, 1e13);
        assert_eq!(tax.igst, 2.8e12);
    }

    #[test]
    fn test_zero_rate_is_allowed() {
        let tax = compute_line_tax(
            &InvoiceLine::new("Sample", 1.0, 0.0, 18.0),
            &TaxContext::intrastate(),
        )
        .unwrap();
        assert_eq!(tax.taxable, 0.0);
        assert_eq!(tax.gst_amount(), 0.0);
    }

    #[test]
    fn test_nonstandard_rate_flagged() {
        let line = InvoiceLine::new("Gold", 1.0, 1000.0, 3.0);
        let tax = compute_line_tax(&line, &TaxContext::intrastate()).unwrap();
        assert!(tax.nonstandard_rate);
        assert_eq!(tax.cgst, 15.0);

        let strict = TaxContext::intrastate().strict(true);
        assert!(matches!(
            compute_line_tax(&line, &strict),
            Err(ValidationError::UnsupportedGstRate { .. })
        ));
    }

    #[test]
    fn test_rounded_keeps_halves_equal() {
        // 33.33 × 5% = 1.6665 → half 0.83325 → 0.83 each
        let line = InvoiceLine::new("x", 1.0, 33.33, 5.0);
        let tax = compute_line_tax(&line, &TaxContext::intrastate())
            .unwrap()
            .rounded();
        assert_eq!(tax.cgst, 0.83);
        assert_eq!(tax.sgst, 0.83);
        assert_eq!(tax.taxable, 33.33);
    }

    #[test]
    fn test_derive_context() {
        assert!(TaxContext::derive("27", Some("27")).unwrap().is_intrastate);
        assert!(!TaxContext::derive("27", Some("29")).unwrap().is_intrastate);
        assert!(TaxContext::derive("27", None).unwrap().is_intrastate);
        assert!(TaxContext::derive("7", Some("07")).unwrap().is_intrastate);
        assert!(TaxContext::derive("27", Some("XX")).is_err());
    }

    #[test]
    fn test_context_for_invoice() {
        let store = StoreProfile {
            legal_name: "Sharma General Stores".into(),
            gstin: "27AAPFU0939F1ZV".into(),
            ..Default::default()
        };
        let local = Buyer::default();
        let karnataka = Buyer {
            name: "Asha Traders".into(),
            tax_id: Some("29AAGCB7383J1Z4".into()),
            ..Default::default()
        };
        assert!(TaxContext::for_invoice(&store, &local).unwrap().is_intrastate);
        assert!(!TaxContext::for_invoice(&store, &karnataka).unwrap().is_intrastate);
    }
}
