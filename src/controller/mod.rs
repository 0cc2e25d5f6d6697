//! Controller core: classification, policies and rule installation
//!
//! Everything here is runtime-agnostic. Events arrive through the
//! [`SwitchEvents`] trait and messages leave through the switch
//! connection handle; nothing reaches into the transport.

pub mod adapter;
pub mod address_list;
pub mod classifier;
pub mod firewall;
pub mod hub;
pub mod installer;

pub use adapter::{EventAdapter, SwitchEvents};
pub use address_list::AddressList;
pub use classifier::{classify, ClassifiedPacket};
pub use firewall::{Decision, Firewall, DROP_PRIORITY};
pub use hub::Hub;
