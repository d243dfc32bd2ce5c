//! Rendered receipt
//!
//! Laid-out lines plus the trailing markers (invoice barcode, payment QR,
//! feed before the cut). Consumed only by the encoder and the dispatcher.

use crate::layout::{ReceiptExtras, layout_receipt};
use crate::money::format_amount;
use crate::tax::InvoiceTotals;
use kirana_printer::{Code128, QrData, ReceiptMarkers, TextLine, encode_receipt};
use shared::{Invoice, PrinterProfile, StoreProfile, ValidationResult};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReceipt {
    pub lines: Vec<TextLine>,
    pub markers: ReceiptMarkers,
}

impl RenderedReceipt {
    /// Lay out the invoice and attach the markers the printer profile asks for
    pub fn render(
        invoice: &Invoice,
        totals: &InvoiceTotals,
        store: &StoreProfile,
        printer: &PrinterProfile,
        extras: &ReceiptExtras,
    ) -> ValidationResult<Self> {
        let lines = layout_receipt(invoice, totals, store, printer, extras)?;
        let markers = markers_for(invoice, totals, store, printer);
        Ok(Self { lines, markers })
    }

    /// ESC/POS payload
    pub fn encode(&self) -> Vec<u8> {
        encode_receipt(&self.lines, &self.markers)
    }

    pub fn text(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Markers for one invoice
///
/// A barcode or QR payload the printer cannot take is left out with a
/// warning; the receipt itself still prints.
pub fn markers_for(
    invoice: &Invoice,
    totals: &InvoiceTotals,
    store: &StoreProfile,
    printer: &PrinterProfile,
) -> ReceiptMarkers {
    let barcode = if printer.print_barcode {
        Code128::code_set_b(&invoice.invoice_number)
            .inspect_err(|e| warn!(invoice = %invoice.invoice_number, "Barcode skipped: {e}"))
            .ok()
    } else {
        None
    };

    let qr_code = match store.upi_id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(upi_id) if printer.print_qr && totals.grand_total > 0.0 => {
            let link = upi_link(
                upi_id.trim(),
                &store.legal_name,
                totals.grand_total,
                &invoice.invoice_number,
            );
            QrData::new(link)
                .inspect_err(|e| warn!(invoice = %invoice.invoice_number, "QR code skipped: {e}"))
                .ok()
        }
        _ => None,
    };

    ReceiptMarkers {
        barcode,
        qr_code,
        feed_lines: printer.feed_lines,
    }
}

/// UPI deep link for the payment QR code
pub fn upi_link(upi_id: &str, payee: &str, amount: f64, reference: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR&tn={}",
        percent_encode(upi_id),
        percent_encode(payee),
        format_amount(amount),
        percent_encode(reference),
    )
}

/// RFC 3986 percent-encoding, unreserved characters kept
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'@' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
