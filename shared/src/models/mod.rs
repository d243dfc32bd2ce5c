//! Data models
//!
//! Plain records handed to the engine by the back office. They are built per
//! print request and never mutated by the engine.

pub mod gst;
pub mod invoice;
pub mod printer_profile;
pub mod store_info;

// Re-exports
pub use gst::*;
pub use invoice::*;
pub use printer_profile::*;
pub use store_info::*;
