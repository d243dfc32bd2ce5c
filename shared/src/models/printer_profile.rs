//! Printer Profile Model

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// Columns on 58mm paper
pub const NARROW_COLUMNS: usize = 32;
/// Default columns on 80mm paper
pub const WIDE_COLUMNS: usize = 48;
/// Smallest column count accepted for 80mm paper (font A on some models)
pub const WIDE_MIN_COLUMNS: usize = 42;

/// Paper width class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperWidth {
    /// 58mm, 32 columns
    Narrow,
    /// 80mm, 42-48 columns
    #[default]
    Wide,
}

/// Printer settings that shape the receipt layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterProfile {
    #[serde(default)]
    pub width: PaperWidth,
    /// Column override for wide paper (42-48)
    #[serde(default)]
    pub columns: Option<usize>,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Print the invoice number as a CODE128 barcode
    #[serde(default = "default_true")]
    pub print_barcode: bool,
    /// Print a UPI payment QR code when the store has a UPI id
    #[serde(default)]
    pub print_qr: bool,
    /// Blank lines fed before the cut
    #[serde(default = "default_feed_lines")]
    pub feed_lines: u8,
}

fn default_currency_symbol() -> String {
    "Rs.".to_string()
}

fn default_true() -> bool {
    true
}

fn default_feed_lines() -> u8 {
    4
}

impl PrinterProfile {
    pub fn narrow() -> Self {
        Self {
            width: PaperWidth::Narrow,
            ..Self::default()
        }
    }

    pub fn wide() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Character budget per line
    pub fn columns(&self) -> ValidationResult<usize> {
        match self.width {
            PaperWidth::Narrow => match self.columns {
                None | Some(NARROW_COLUMNS) => Ok(NARROW_COLUMNS),
                Some(other) => Err(ValidationError::InvalidPrinterWidth(other)),
            },
            PaperWidth::Wide => {
                let columns = self.columns.unwrap_or(WIDE_COLUMNS);
                if (WIDE_MIN_COLUMNS..=WIDE_COLUMNS).contains(&columns) {
                    Ok(columns)
                } else {
                    Err(ValidationError::InvalidPrinterWidth(columns))
                }
            }
        }
    }

    pub fn is_narrow(&self) -> bool {
        self.width == PaperWidth::Narrow
    }
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self {
            width: PaperWidth::Wide,
            columns: None,
            currency_symbol: default_currency_symbol(),
            print_barcode: true,
            print_qr: false,
            feed_lines: default_feed_lines(),
        }
    }
}
