//! Control-plane runtime
//!
//! Owns the TCP listener, the OpenFlow handshake, and the per-switch
//! session tasks; hands decoded events to the controller layer.

mod connection;
mod listener;

pub use connection::SwitchConnection;
pub use listener::serve;
