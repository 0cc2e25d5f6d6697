//! Floodgate - OpenFlow controller
//!
//! A small OpenFlow 1.0 controller that drives Ethernet switches as
//! either plain hubs or as an IP blacklist firewall. Policies react to
//! switch events and install flow rules; the switches forward matched
//! traffic themselves.

pub mod config;
pub mod controller;
pub mod error;
pub mod openflow;
pub mod protocol;
pub mod runtime;
pub mod telemetry;

pub use error::{Error, Result};
