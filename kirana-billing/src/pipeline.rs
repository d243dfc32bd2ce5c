//! Print pipeline
//!
//! Invoice → tax breakdown → totals → layout → ESC/POS → transport.
//! Everything up to the payload is synchronous and pure; delivery is one
//! async attempt.

use crate::error::BillingResult;
use crate::layout::ReceiptExtras;
use crate::receipt::RenderedReceipt;
use crate::tax::{InvoiceTotals, TaxContext, aggregate_with};
use kirana_printer::{DeliveryMethod, Dispatcher};
use serde::{Deserialize, Serialize};
use shared::{Invoice, PrinterProfile, RoundingMode, StoreProfile};
use tracing::{info, instrument};

/// One print request as read from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    pub invoice: Invoice,
    pub store: StoreProfile,
    /// Falls back to the configured profile when absent
    #[serde(default)]
    pub printer: Option<PrinterProfile>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
}

impl PrintRequest {
    pub fn extras(&self) -> ReceiptExtras {
        ReceiptExtras {
            footer: self.footer.clone(),
            terms: self.terms.clone(),
        }
    }
}

/// Result of rendering one invoice
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub totals: InvoiceTotals,
    pub receipt: RenderedReceipt,
    pub payload: Vec<u8>,
}

/// Tax and rendering policy shared by every request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BillingEngine {
    pub rounding: RoundingMode,
    pub strict_rates: bool,
}

impl BillingEngine {
    pub fn new(rounding: RoundingMode, strict_rates: bool) -> Self {
        Self {
            rounding,
            strict_rates,
        }
    }

    /// Price an invoice without laying it out
    pub fn totals(&self, invoice: &Invoice, store: &StoreProfile) -> BillingResult<InvoiceTotals> {
        store.validate()?;
        invoice.buyer.validate()?;
        let ctx = TaxContext::for_invoice(store, &invoice.buyer)?.strict(self.strict_rates);
        Ok(aggregate_with(&invoice.lines, &ctx, self.rounding)?)
    }

    /// Compute, lay out and encode one invoice
    #[instrument(skip_all, fields(invoice = %invoice.invoice_number, lines = invoice.lines.len()))]
    pub fn render(
        &self,
        invoice: &Invoice,
        store: &StoreProfile,
        printer: &PrinterProfile,
        extras: &ReceiptExtras,
    ) -> BillingResult<PrintJob> {
        let totals = self.totals(invoice, store)?;
        let receipt = RenderedReceipt::render(invoice, &totals, store, printer, extras)?;
        let payload = receipt.encode();

        info!(
            grand_total = totals.grand_total,
            round_off = totals.round_off,
            intrastate = totals.is_intrastate,
            bytes = payload.len(),
            "Receipt rendered"
        );
        Ok(PrintJob {
            totals,
            receipt,
            payload,
        })
    }

    /// Render a request and deliver it
    ///
    /// Validation failures stop before any byte reaches a transport.
    pub async fn print(
        &self,
        dispatcher: &Dispatcher,
        request: &PrintRequest,
        default_printer: &PrinterProfile,
        method: DeliveryMethod,
    ) -> BillingResult<PrintJob> {
        let printer = request.printer.as_ref().unwrap_or(default_printer);
        let job = self.render(&request.invoice, &request.store, printer, &request.extras())?;
        dispatcher.deliver(&job.payload, method).await?;
        Ok(job)
    }
}
