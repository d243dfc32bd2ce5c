//! Totals Aggregator
//!
//! Folds per-line breakdowns into invoice totals. Each line is rounded to
//! paise before summing; the grand total is rounded to whole rupees in a
//! separate stage.

use super::calculator::{TaxBreakdown, TaxContext, compute_line_tax};
use crate::money::{round_paise, round_rupees, to_decimal, to_f64};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{InvoiceLine, RoundingMode, ValidationResult};
use std::collections::BTreeMap;
use tracing::debug;

/// Tax summary for one GST rate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GstSummaryRow {
    pub gst_rate: f64,
    pub taxable: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
}

impl GstSummaryRow {
    pub fn gst_amount(&self) -> f64 {
        to_f64(to_decimal(self.cgst) + to_decimal(self.sgst) + to_decimal(self.igst))
    }
}

/// Invoice-level totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Σ quantity × rate
    pub subtotal: f64,
    pub discount_amount: f64,
    pub taxable_amount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    /// grand_total − (taxable + cgst + sgst + igst)
    pub round_off: f64,
    pub grand_total: f64,
    pub total_quantity: f64,
    pub line_count: usize,
    pub is_intrastate: bool,
    /// Ordered by rate
    pub gst_summary: Vec<GstSummaryRow>,
    /// Paise-rounded breakdown per input line, same order
    pub line_breakdowns: Vec<TaxBreakdown>,
}

impl InvoiceTotals {
    pub fn gst_amount(&self) -> f64 {
        to_f64(to_decimal(self.cgst) + to_decimal(self.sgst) + to_decimal(self.igst))
    }

    /// Total before round-off
    pub fn unrounded_total(&self) -> f64 {
        to_f64(to_decimal(self.taxable_amount) + to_decimal(self.gst_amount()))
    }
}

#[derive(Default)]
struct RateBucket {
    taxable: Decimal,
    cgst: Decimal,
    sgst: Decimal,
    igst: Decimal,
}

/// Aggregate with the default rounding mode (half away from zero)
pub fn aggregate(lines: &[InvoiceLine], ctx: &TaxContext) -> ValidationResult<InvoiceTotals> {
    aggregate_with(lines, ctx, RoundingMode::default())
}

/// Aggregate with an explicit grand-total rounding mode
///
/// Every line is validated first; one bad line rejects the whole invoice.
pub fn aggregate_with(
    lines: &[InvoiceLine],
    ctx: &TaxContext,
    mode: RoundingMode,
) -> ValidationResult<InvoiceTotals> {
    let breakdowns = lines
        .iter()
        .map(|line| compute_line_tax(line, ctx).map(|tax| tax.rounded()))
        .collect::<ValidationResult<Vec<_>>>()?;

    let mut subtotal = Decimal::ZERO;
    let mut discount = Decimal::ZERO;
    let mut taxable = Decimal::ZERO;
    let mut cgst = Decimal::ZERO;
    let mut sgst = Decimal::ZERO;
    let mut igst = Decimal::ZERO;
    let mut quantity = Decimal::ZERO;
    // Keyed by rate in basis points so 12.5% and 12% stay apart
    let mut buckets: BTreeMap<i64, (f64, RateBucket)> = BTreeMap::new();

    for (line, tax) in lines.iter().zip(&breakdowns) {
        subtotal += to_decimal(tax.gross);
        discount += to_decimal(tax.discount);
        taxable += to_decimal(tax.taxable);
        cgst += to_decimal(tax.cgst);
        sgst += to_decimal(tax.sgst);
        igst += to_decimal(tax.igst);
        quantity += to_decimal(line.quantity);

        let key = (tax.gst_rate * 100.0).round() as i64;
        let (_, bucket) = buckets
            .entry(key)
            .or_insert_with(|| (tax.gst_rate, RateBucket::default()));
        bucket.taxable += to_decimal(tax.taxable);
        bucket.cgst += to_decimal(tax.cgst);
        bucket.sgst += to_decimal(tax.sgst);
        bucket.igst += to_decimal(tax.igst);
    }

    let unrounded = taxable + cgst + sgst + igst;
    let grand_total = round_rupees(unrounded, mode);
    let round_off = grand_total - unrounded;

    let gst_summary = buckets
        .into_values()
        .map(|(gst_rate, b)| GstSummaryRow {
            gst_rate,
            taxable: to_f64(round_paise(b.taxable)),
            cgst: to_f64(round_paise(b.cgst)),
            sgst: to_f64(round_paise(b.sgst)),
            igst: to_f64(round_paise(b.igst)),
        })
        .collect();

    debug!(
        lines = lines.len(),
        taxable = %taxable,
        unrounded = %unrounded,
        grand_total = %grand_total,
        mode = %mode,
        "Invoice totals aggregated"
    );

    Ok(InvoiceTotals {
        subtotal: to_f64(subtotal),
        discount_amount: to_f64(discount),
        taxable_amount: to_f64(taxable),
        cgst: to_f64(cgst),
        sgst: to_f64(sgst),
        igst: to_f64(igst),
        round_off: to_f64(round_off),
        grand_total: to_f64(grand_total),
        total_quantity: to_f64(quantity),
        line_count: lines.len(),
        is_intrastate: ctx.is_intrastate,
        gst_summary,
        line_breakdowns: breakdowns,
    })
}
