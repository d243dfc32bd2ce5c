//! Transport adapters for delivering ESC/POS payloads
//!
//! Supports:
//! - Hidden frame: monospace HTML handed to the OS print spooler
//! - Serial port: raw bytes to a device node
//! - Bluetooth: raw bytes to a paired printer's RFCOMM node
//! - Preview: decoded text on stdout or in a file, no device bytes
//!
//! Every delivery is one attempt. Nothing is retried here and device
//! handles never outlive a single `write`.

mod bluetooth;
mod hidden_frame;
mod preview;
mod serial;

pub use bluetooth::{
    BluetoothTransport, DEFAULT_CHARACTERISTIC_UUID, DEFAULT_CHUNK_SIZE, DEFAULT_SERVICE_UUID,
    PairedDevice,
};
pub use hidden_frame::{HiddenFrameTransport, render_html};
pub use preview::{PreviewSink, PreviewTransport};
pub use serial::SerialTransport;

use crate::error::TransportResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// Delivery channel selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryMethod {
    #[default]
    HiddenFrame,
    SerialPort,
    Bluetooth,
    Preview,
}

impl DeliveryMethod {
    pub const ALL: [DeliveryMethod; 4] = [
        Self::HiddenFrame,
        Self::SerialPort,
        Self::Bluetooth,
        Self::Preview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HiddenFrame => "hiddenFrame",
            Self::SerialPort => "serialPort",
            Self::Bluetooth => "bluetooth",
            Self::Preview => "preview",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "hiddenframe" | "driver" => Ok(Self::HiddenFrame),
            "serialport" | "serial" => Ok(Self::SerialPort),
            "bluetooth" | "bt" => Ok(Self::Bluetooth),
            "preview" => Ok(Self::Preview),
            _ => Err(format!("unknown delivery method: {}", s)),
        }
    }
}

/// Trait for transport adapters
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Which delivery method this adapter implements
    fn method(&self) -> DeliveryMethod;

    /// Send a complete ESC/POS payload
    async fn write(&self, payload: &[u8]) -> TransportResult<()>;
}

/// Routes a payload to the adapter for the selected method
#[derive(Debug, Clone)]
pub struct Dispatcher {
    hidden_frame: HiddenFrameTransport,
    serial: SerialTransport,
    bluetooth: BluetoothTransport,
    preview: PreviewTransport,
}

impl Dispatcher {
    pub fn new(
        hidden_frame: HiddenFrameTransport,
        serial: SerialTransport,
        bluetooth: BluetoothTransport,
        preview: PreviewTransport,
    ) -> Self {
        Self {
            hidden_frame,
            serial,
            bluetooth,
            preview,
        }
    }

    /// Deliver a payload through one method
    ///
    /// Errors carry the method so the caller can choose a different one.
    #[instrument(skip(self, payload), fields(method = %method, bytes = payload.len()))]
    pub async fn deliver(&self, payload: &[u8], method: DeliveryMethod) -> TransportResult<()> {
        let result = match method {
            DeliveryMethod::HiddenFrame => self.hidden_frame.write(payload).await,
            DeliveryMethod::SerialPort => self.serial.write(payload).await,
            DeliveryMethod::Bluetooth => self.bluetooth.write(payload).await,
            DeliveryMethod::Preview => self.preview.write(payload).await,
        };

        match &result {
            Ok(()) => info!("Receipt delivered"),
            Err(e) => warn!(error = %e, unavailable = e.is_unavailable(), "Delivery failed"),
        }
        result
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(
            HiddenFrameTransport::default(),
            SerialTransport::default(),
            BluetoothTransport::default(),
            PreviewTransport::default(),
        )
    }
}
