//! # kirana-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - Typed ESC/POS commands with one encoder and one decoder
//! - Column-width helpers and WPC1252 text encoding
//! - Delivery over four transports (hidden frame, serial, Bluetooth, preview)
//!
//! Business logic (WHAT to print) stays in `kirana-billing`.
//!
//! ## Example
//!
//! ```ignore
//! use kirana_printer::{DeliveryMethod, Dispatcher, ReceiptMarkers, TextLine, encode_receipt};
//!
//! let lines = vec![TextLine::new("TAX INVOICE").bold()];
//! let payload = encode_receipt(&lines, &ReceiptMarkers::default());
//!
//! Dispatcher::default()
//!     .deliver(&payload, DeliveryMethod::Preview)
//!     .await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod transport;

// Re-exports
pub use encoding::{
    CODE_PAGE_WPC1252, ELLIPSIS, center_width, decode_text, ellipsize, encode_text, pad_width,
    text_width, truncate_width,
};
pub use error::{DecodeError, EncodeError, TransportError, TransportResult};
pub use escpos::{
    Align, Code128, Command, EscPosBuilder, HriPosition, QrData, ReceiptMarkers, TextLine, decode,
    encode, encode_receipt, plain_text, receipt_commands,
};
pub use transport::{
    BluetoothTransport, DEFAULT_CHARACTERISTIC_UUID, DEFAULT_CHUNK_SIZE, DEFAULT_SERVICE_UUID,
    DeliveryMethod, Dispatcher, HiddenFrameTransport, PairedDevice, PreviewSink, PreviewTransport,
    SerialTransport, Transport, render_html,
};
