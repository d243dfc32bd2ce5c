//! Serial port printer
//!
//! Writes raw bytes to a serial/USB device node (`/dev/ttyUSB0`,
//! `/dev/usb/lp0`, `COM3`). Line settings are left to the OS.

use super::{DeliveryMethod, Transport};
use crate::error::{TransportError, TransportResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

const METHOD: DeliveryMethod = DeliveryMethod::SerialPort;

#[derive(Debug, Clone, Default)]
pub struct SerialTransport {
    device: Option<PathBuf>,
}

impl SerialTransport {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: Some(device.into()),
        }
    }

    /// Transport with no device configured; every write is `Unavailable`
    pub fn unconfigured() -> Self {
        Self { device: None }
    }

    pub fn device(&self) -> Option<&Path> {
        self.device.as_deref()
    }
}

impl Transport for SerialTransport {
    fn method(&self) -> DeliveryMethod {
        METHOD
    }

    #[instrument(skip(self, payload), fields(device = ?self.device, data_len = payload.len()))]
    async fn write(&self, payload: &[u8]) -> TransportResult<()> {
        let device = self
            .device
            .as_deref()
            .ok_or_else(|| TransportError::unavailable(METHOD, "no serial device configured"))?;

        // Checked before opening so a missing device never receives partial output
        match tokio::fs::try_exists(device).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(TransportError::unavailable(
                    METHOD,
                    format!("device not found: {}", device.display()),
                ));
            }
            Err(e) => {
                return Err(TransportError::unavailable(
                    METHOD,
                    format!("cannot stat {}: {}", device.display(), e),
                ));
            }
        }

        // The handle is dropped (closed) at the end of this scope on every path
        let mut port = OpenOptions::new()
            .write(true)
            .open(device)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => TransportError::unavailable(
                    METHOD,
                    format!("device not found: {}", device.display()),
                ),
                _ => TransportError::failure(
                    METHOD,
                    format!("open {} failed: {}", device.display(), e),
                ),
            })?;

        info!("Port open, sending {} bytes", payload.len());

        port.write_all(payload)
            .await
            .map_err(|e| TransportError::failure(METHOD, format!("write failed: {}", e)))?;
        port.flush()
            .await
            .map_err(|e| TransportError::failure(METHOD, format!("flush failed: {}", e)))?;

        info!("Print job sent successfully");
        Ok(())
    }
}
