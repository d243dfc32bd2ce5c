//! GST rate set and rounding policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed GST slab rates, in percent
pub const GST_RATES: [f64; 5] = [0.0, 5.0, 12.0, 18.0, 28.0];

/// Whether `rate` is one of the fixed slab rates
pub fn is_standard_gst_rate(rate: f64) -> bool {
    GST_RATES.iter().any(|r| (r - rate).abs() < 1e-9)
}

/// Tie-breaking used when rounding the invoice to whole rupees
///
/// The default matches the legacy behaviour (`x.5` goes up for positive
/// amounts).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 94.5 → 95
    #[default]
    HalfAwayFromZero,
    /// 94.5 → 94, 95.5 → 96
    HalfEven,
    /// 94.5 → 94
    HalfTowardZero,
    /// Always down (floor)
    Down,
    /// Always up (ceil)
    Up,
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::HalfAwayFromZero => "half_away_from_zero",
            Self::HalfEven => "half_even",
            Self::HalfTowardZero => "half_toward_zero",
            Self::Down => "down",
            Self::Up => "up",
        };
        f.write_str(s)
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "half_away_from_zero" | "half_up" | "round" => Ok(Self::HalfAwayFromZero),
            "half_even" | "bankers" => Ok(Self::HalfEven),
            "half_toward_zero" | "half_down" => Ok(Self::HalfTowardZero),
            "down" | "floor" => Ok(Self::Down),
            "up" | "ceil" => Ok(Self::Up),
            other => Err(format!("unknown rounding mode: {other}")),
        }
    }
}
