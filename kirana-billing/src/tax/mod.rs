//! GST Engine Module
//!
//! Per-line tax computation and invoice-level aggregation.

mod aggregator;
mod calculator;

pub use aggregator::*;
pub use calculator::*;
