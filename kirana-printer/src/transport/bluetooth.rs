//! Bluetooth printer
//!
//! Picks the first paired device that exposes the printer service and
//! characteristic, then streams the payload to its RFCOMM node in chunks.

use super::{DeliveryMethod, Transport};
use crate::error::{TransportError, TransportResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const METHOD: DeliveryMethod = DeliveryMethod::Bluetooth;

/// Printer service exposed by most generic BLE thermal printers
pub const DEFAULT_SERVICE_UUID: Uuid = Uuid::from_u128(0x000018f0_0000_1000_8000_00805f9b34fb);
/// Write characteristic under [`DEFAULT_SERVICE_UUID`]
pub const DEFAULT_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x00002af1_0000_1000_8000_00805f9b34fb);
/// Bytes per write, sized for common BLE MTUs
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// A device known to the host's Bluetooth stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedDevice {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub services: Vec<Uuid>,
    #[serde(default)]
    pub characteristics: Vec<Uuid>,
    /// RFCOMM node bound to the device (`/dev/rfcomm0`)
    pub port: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BluetoothTransport {
    devices: Vec<PairedDevice>,
    service_uuid: Uuid,
    characteristic_uuid: Uuid,
    chunk_size: usize,
}

impl BluetoothTransport {
    pub fn new(devices: Vec<PairedDevice>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    pub fn with_service(mut self, service: Uuid, characteristic: Uuid) -> Self {
        self.service_uuid = service;
        self.characteristic_uuid = characteristic;
        self
    }

    /// Set bytes per write (minimum 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Find the paired device exposing the printer service
    pub fn discover(&self) -> TransportResult<&PairedDevice> {
        if self.devices.is_empty() {
            return Err(TransportError::unavailable(METHOD, "no paired devices"));
        }
        self.devices
            .iter()
            .find(|d| {
                d.services.contains(&self.service_uuid)
                    && d.characteristics.contains(&self.characteristic_uuid)
            })
            .ok_or_else(|| {
                TransportError::unavailable(
                    METHOD,
                    format!(
                        "no paired device exposes service {} / characteristic {}",
                        self.service_uuid, self.characteristic_uuid
                    ),
                )
            })
    }
}

impl Default for BluetoothTransport {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            service_uuid: DEFAULT_SERVICE_UUID,
            characteristic_uuid: DEFAULT_CHARACTERISTIC_UUID,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Transport for BluetoothTransport {
    fn method(&self) -> DeliveryMethod {
        METHOD
    }

    #[instrument(skip(self, payload), fields(data_len = payload.len()))]
    async fn write(&self, payload: &[u8]) -> TransportResult<()> {
        let device = self.discover()?;
        info!(name = %device.name, address = %device.address, "Connecting to printer");

        // Paired but not connected: the RFCOMM node is missing or busy
        let mut link = OpenOptions::new()
            .write(true)
            .open(&device.port)
            .await
            .map_err(|e| {
                TransportError::failure(
                    METHOD,
                    format!("connect to {} ({}) failed: {}", device.name, device.address, e),
                )
            })?;

        for (idx, chunk) in payload.chunks(self.chunk_size).enumerate() {
            link.write_all(chunk).await.map_err(|e| {
                TransportError::failure(METHOD, format!("write of chunk {} failed: {}", idx, e))
            })?;
            debug!(chunk = idx, bytes = chunk.len(), "Chunk written");
        }
        link.flush()
            .await
            .map_err(|e| TransportError::failure(METHOD, format!("flush failed: {}", e)))?;

        info!("Print job sent successfully");
        Ok(())
    }
}
