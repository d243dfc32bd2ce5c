//! # kirana-billing
//!
//! GST invoice engine for small retail counters.
//!
//! This crate decides WHAT to print:
//! - [`tax`]: per-line GST breakdown and invoice totals
//! - [`layout`]: fixed-width receipt lines for 58mm and 80mm paper
//! - [`receipt`]: lines plus barcode / QR markers, encoded to ESC/POS
//! - [`pipeline`]: the whole path from invoice JSON to a delivered payload
//!
//! Printing itself (encoding, transports) lives in `kirana-printer`.

pub mod config;
pub mod error;
pub mod layout;
pub mod logger;
pub mod money;
pub mod pipeline;
pub mod receipt;
pub mod tax;

// Re-exports
pub use config::Config;
pub use error::{BillingError, BillingResult};
pub use layout::{ReceiptExtras, layout_receipt};
pub use logger::{init_logger, init_logger_with_file};
pub use pipeline::{BillingEngine, PrintJob, PrintRequest};
pub use receipt::RenderedReceipt;
pub use tax::{
    GstSummaryRow, InvoiceTotals, TaxBreakdown, TaxContext, aggregate, aggregate_with,
    compute_line_tax,
};
