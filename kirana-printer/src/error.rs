//! Error types for the printer library

use crate::transport::DeliveryMethod;
use thiserror::Error;

/// Delivery error, scoped to the transport that produced it
///
/// `Unavailable` means the channel does not exist on this host (no device,
/// no spooler). `Failure` means the channel exists but the open/write
/// failed. Callers pick their recovery from the method and the kind.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Transport API or device not present
    #[error("{method} unavailable: {reason}")]
    Unavailable {
        method: DeliveryMethod,
        reason: String,
    },

    /// Device present but open/write failed
    #[error("{method} failed: {reason}")]
    Failure {
        method: DeliveryMethod,
        reason: String,
    },
}

impl TransportError {
    pub fn unavailable(method: DeliveryMethod, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            method,
            reason: reason.into(),
        }
    }

    pub fn failure(method: DeliveryMethod, reason: impl Into<String>) -> Self {
        Self::Failure {
            method,
            reason: reason.into(),
        }
    }

    /// Method the error belongs to
    pub fn method(&self) -> DeliveryMethod {
        match self {
            Self::Unavailable { method, .. } | Self::Failure { method, .. } => *method,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Whether the user should be asked to reconnect the printer
    ///
    /// Serial and Bluetooth failures are usually a cable or pairing problem.
    /// Hidden-frame failures are spooler/permission problems instead.
    pub fn needs_reconnect(&self) -> bool {
        matches!(
            self,
            Self::Failure {
                method: DeliveryMethod::SerialPort | DeliveryMethod::Bluetooth,
                ..
            }
        )
    }
}

/// Result type for delivery
pub type TransportResult<T> = Result<T, TransportError>;

/// Invalid command parameters rejected before any byte is produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("barcode payload must be 1-255 bytes, got {0}")]
    BarcodeLength(usize),

    #[error("barcode payload byte 0x{0:02X} is outside CODE128 range")]
    BarcodeByte(u8),

    #[error("QR payload must be 1-7089 bytes, got {0}")]
    QrLength(usize),
}

/// Malformed ESC/POS byte stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown command 0x{byte:02X} 0x{next:02X} at offset {offset}")]
    UnknownCommand { offset: usize, byte: u8, next: u8 },

    #[error("truncated {command} command at offset {offset}")]
    Truncated {
        offset: usize,
        command: &'static str,
    },

    #[error("invalid {command} parameter 0x{value:02X} at offset {offset}")]
    InvalidParameter {
        offset: usize,
        command: &'static str,
        value: u8,
    },
}
