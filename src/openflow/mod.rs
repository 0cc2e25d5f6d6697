//! OpenFlow 1.0 wire protocol
//!
//! Hand-rolled big-endian codec for the message subset the controller
//! speaks: handshake, keepalive, packet-in and flow-mod.

pub mod flow_mod;
pub mod message;
pub mod packet_in;
pub mod types;

pub use types::*;
