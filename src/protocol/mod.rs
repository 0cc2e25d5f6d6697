//! Network protocol parsing
//!
//! Zero-copy readers for the layers the controller inspects on packet-in.

pub mod ethernet;
pub mod ipv4;
pub mod types;

pub use types::*;
