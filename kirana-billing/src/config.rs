//! Configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | PRINTER_WIDTH | wide | `narrow` (58mm) or `wide` (80mm) |
//! | PRINTER_COLUMNS | 32 / 48 | column override for wide paper (42-48) |
//! | PRINT_METHOD | hiddenFrame | `hiddenFrame`, `serialPort`, `bluetooth`, `preview` |
//! | SERIAL_DEVICE | - | device node, e.g. `/dev/ttyUSB0` |
//! | BT_DEVICES_FILE | - | JSON list of paired devices |
//! | BT_SERVICE_UUID | 000018f0-... | printer service to look for |
//! | BT_CHARACTERISTIC_UUID | 00002af1-... | write characteristic |
//! | BT_CHUNK_SIZE | 512 | bytes per Bluetooth write |
//! | SPOOLER_COMMAND | lp | spooler command line for the hidden frame |
//! | PRINTER_NAME | - | spooler queue name (`-d`) |
//! | PREVIEW_DIR | - | write previews here instead of stdout |
//! | ROUNDING_MODE | half_away_from_zero | grand total tie-breaking |
//! | STRICT_GST_RATES | false | reject rates outside 0/5/12/18/28 |
//! | CURRENCY_SYMBOL | Rs. | prefix of the grand total |
//! | LOG_LEVEL | info | tracing filter |
//! | LOG_DIR | - | daily log files go here when set |

use crate::error::{BillingError, BillingResult};
use crate::pipeline::BillingEngine;
use kirana_printer::{
    BluetoothTransport, DEFAULT_CHARACTERISTIC_UUID, DEFAULT_CHUNK_SIZE, DEFAULT_SERVICE_UUID,
    DeliveryMethod, Dispatcher, HiddenFrameTransport, PairedDevice, PreviewSink, PreviewTransport,
    SerialTransport,
};
use shared::{PaperWidth, PrinterProfile, RoundingMode};
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub paper_width: PaperWidth,
    pub columns: Option<usize>,
    pub print_method: DeliveryMethod,
    pub serial_device: Option<PathBuf>,
    pub bt_devices_file: Option<PathBuf>,
    pub bt_service_uuid: Uuid,
    pub bt_characteristic_uuid: Uuid,
    pub bt_chunk_size: usize,
    pub spooler_command: String,
    pub printer_name: Option<String>,
    pub preview_dir: Option<PathBuf>,
    pub rounding_mode: RoundingMode,
    pub strict_gst_rates: bool,
    pub currency_symbol: String,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> BillingResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset and empty keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> BillingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let paper_width = match get("PRINTER_WIDTH").as_deref() {
            None => PaperWidth::default(),
            Some(v) if v.eq_ignore_ascii_case("narrow") || v == "58" || v == "58mm" => {
                PaperWidth::Narrow
            }
            Some(v) if v.eq_ignore_ascii_case("wide") || v == "80" || v == "80mm" => {
                PaperWidth::Wide
            }
            Some(v) => return Err(invalid("PRINTER_WIDTH", v)),
        };

        Ok(Self {
            paper_width,
            columns: parse_opt(&get, "PRINTER_COLUMNS")?,
            print_method: parse_or(&get, "PRINT_METHOD", DeliveryMethod::default())?,
            serial_device: get("SERIAL_DEVICE").map(PathBuf::from),
            bt_devices_file: get("BT_DEVICES_FILE").map(PathBuf::from),
            bt_service_uuid: parse_or(&get, "BT_SERVICE_UUID", DEFAULT_SERVICE_UUID)?,
            bt_characteristic_uuid: parse_or(
                &get,
                "BT_CHARACTERISTIC_UUID",
                DEFAULT_CHARACTERISTIC_UUID,
            )?,
            bt_chunk_size: parse_or(&get, "BT_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            spooler_command: get("SPOOLER_COMMAND").unwrap_or_else(|| "lp".into()),
            printer_name: get("PRINTER_NAME"),
            preview_dir: get("PREVIEW_DIR").map(PathBuf::from),
            rounding_mode: parse_or(&get, "ROUNDING_MODE", RoundingMode::default())?,
            strict_gst_rates: parse_bool(&get, "STRICT_GST_RATES")?,
            currency_symbol: get("CURRENCY_SYMBOL").unwrap_or_else(|| "Rs.".into()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: get("LOG_DIR"),
        })
    }

    /// Printer profile used when a request carries none
    pub fn printer_profile(&self) -> BillingResult<PrinterProfile> {
        let profile = PrinterProfile {
            width: self.paper_width,
            columns: self.columns,
            currency_symbol: self.currency_symbol.clone(),
            ..PrinterProfile::default()
        };
        profile.columns()?;
        Ok(profile)
    }

    pub fn engine(&self) -> BillingEngine {
        BillingEngine::new(self.rounding_mode, self.strict_gst_rates)
    }

    /// Build all four transports
    ///
    /// Reads the paired device list when `BT_DEVICES_FILE` is set.
    pub async fn dispatcher(&self) -> BillingResult<Dispatcher> {
        let mut hidden_frame = HiddenFrameTransport::from_command_line(&self.spooler_command);
        if let Some(name) = &self.printer_name {
            hidden_frame = hidden_frame.with_printer(name);
        }

        let serial = match &self.serial_device {
            Some(path) => SerialTransport::new(path.clone()),
            None => SerialTransport::unconfigured(),
        };

        let devices = match &self.bt_devices_file {
            Some(path) => load_paired_devices(path).await?,
            None => Vec::new(),
        };
        let bluetooth = BluetoothTransport::new(devices)
            .with_service(self.bt_service_uuid, self.bt_characteristic_uuid)
            .with_chunk_size(self.bt_chunk_size);

        let preview = PreviewTransport::new(match &self.preview_dir {
            Some(dir) => PreviewSink::Directory(dir.clone()),
            None => PreviewSink::Stdout,
        });

        Ok(Dispatcher::new(hidden_frame, serial, bluetooth, preview))
    }
}

async fn load_paired_devices(path: &std::path::Path) -> BillingResult<Vec<PairedDevice>> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        BillingError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| BillingError::config(format!("invalid device list {}: {}", path.display(), e)))
}

fn invalid(key: &str, value: &str) -> BillingError {
    BillingError::config(format!("invalid value for {key}: '{value}'"))
}

fn parse_opt<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> BillingResult<Option<T>> {
    get(key)
        .map(|v| v.parse().map_err(|_| invalid(key, &v)))
        .transpose()
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> BillingResult<T> {
    Ok(parse_opt(get, key)?.unwrap_or(default))
}

fn parse_bool(get: &impl Fn(&str) -> Option<String>, key: &str) -> BillingResult<bool> {
    match get(key).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(invalid(key, other)),
    }
}
