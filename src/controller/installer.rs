//! Flow rule installation
//!
//! The last stop before the wire: sanity-check the rule, encode it and
//! hand it to the connection. Fire and forget; the switch never acks a
//! flow-mod, so failures only ever surface from the transport.

use crate::openflow::flow_mod::FlowMod;
use crate::runtime::SwitchConnection;
use crate::{Error, Result};
use tracing::{debug, error};

/// Reject rules that cannot mean what they say
///
/// Address match fields are only interpreted when an ethertype pins the
/// network layer. Without one the switch would ignore the addresses and
/// the rule would match far more traffic than intended.
pub fn validate(rule: &FlowMod) -> Result<()> {
    if rule.match_fields.has_network_fields() && rule.match_fields.ether_type.is_none() {
        return Err(Error::InconsistentMatch(
            "network address match requires an ethertype".into(),
        ));
    }
    Ok(())
}

/// Validate, encode and transmit one flow rule
///
/// An invalid rule is logged and never sent. Transmission failures
/// surface to the caller; nothing is retried.
pub fn install(conn: &SwitchConnection, rule: &FlowMod) -> Result<()> {
    if let Err(e) = validate(rule) {
        error!("flow rule rejected, not sent: {}", e);
        return Err(e);
    }
    conn.send(rule.encode(conn.next_xid()))?;
    debug!("flow rule sent to switch {}", conn.datapath());
    Ok(())
}
