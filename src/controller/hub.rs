//! Flood-everything hub policy
//!
//! One wildcard flood rule per switch, installed the moment the switch
//! attaches. After that the switch floods in its own fast path and the
//! controller hears nothing more from it.

use super::adapter::SwitchEvents;
use super::installer;
use crate::openflow::flow_mod::{FlowAction, FlowMod};
use crate::openflow::packet_in::PacketIn;
use crate::openflow::{port, DatapathId};
use crate::runtime::SwitchConnection;
use crate::telemetry::MetricsRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Per-switch bookkeeping for an installed flood rule
#[derive(Debug, Clone)]
struct HubInstance {
    conn: SwitchConnection,
}

pub struct Hub {
    instances: HashMap<DatapathId, HubInstance>,
    metrics: Arc<MetricsRegistry>,
}

impl Hub {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            instances: HashMap::new(),
            metrics,
        }
    }

    /// Wildcard rule flooding every packet
    pub fn flood_rule() -> FlowMod {
        FlowMod {
            actions: vec![FlowAction::Output { port: port::FLOOD }],
            ..Default::default()
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

impl SwitchEvents for Hub {
    fn on_connection_up(&mut self, conn: &SwitchConnection) {
        self.instances
            .insert(conn.datapath(), HubInstance { conn: conn.clone() });
        match installer::install(conn, &Self::flood_rule()) {
            Ok(()) => {
                info!(
                    "flooding enabled on switch {}, {} attached",
                    conn.datapath(),
                    self.instance_count()
                );
                self.metrics.flood_rules_installed.inc();
            }
            Err(e) => error!(
                "failed to install flood rule on {}: {}",
                conn.datapath(),
                e
            ),
        }
    }

    fn on_packet_in(&mut self, _conn: &SwitchConnection, _pkt: &PacketIn<'_>) {
        // The flood rule handles forwarding; nothing to do per packet.
    }

    fn on_connection_down(&mut self, datapath: DatapathId) {
        if let Some(instance) = self.instances.remove(&datapath) {
            debug!(
                "hub instance for switch {} evicted ({})",
                datapath,
                instance.conn.peer()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openflow::message::Header;
    use crate::openflow::MsgType;
    use tokio::sync::mpsc;

    fn make_hub() -> Hub {
        Hub::new(Arc::new(MetricsRegistry::new()))
    }

    fn make_connection(dpid: u64) -> (SwitchConnection, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = SwitchConnection::new(DatapathId(dpid), "127.0.0.1:51000".parse().unwrap(), tx);
        (conn, rx)
    }

    fn make_packet_in_message() -> Vec<u8> {
        let mut msg = Vec::new();
        Header::new(MsgType::PacketIn, 22, 5).encode_into(&mut msg);
        msg.extend_from_slice(&[0xff; 4]);
        msg.extend_from_slice(&[0x00; 6]);
        msg.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        msg
    }

    #[test]
    fn test_connection_up_installs_flood_rule() {
        let mut hub = make_hub();
        let (conn, mut rx) = make_connection(1);

        hub.on_connection_up(&conn);

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg[1], MsgType::FlowMod as u8);
        assert_eq!(&msg[8..12], &[0x00, 0x3f, 0xff, 0xff]); // match everything
        assert_eq!(&msg[62..64], &[0x80, 0x00]); // default priority
        assert_eq!(&msg[76..78], &[0xff, 0xfb]); // output to FLOOD

        // Exactly one rule
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.instance_count(), 1);
    }

    #[test]
    fn test_packet_in_installs_nothing() {
        let mut hub = make_hub();
        let (conn, mut rx) = make_connection(1);

        hub.on_connection_up(&conn);
        rx.try_recv().unwrap(); // drain the flood rule

        let msg = make_packet_in_message();
        let pkt = PacketIn::parse(&msg).unwrap();
        hub.on_packet_in(&conn, &pkt);
        hub.on_packet_in(&conn, &pkt);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_connection_down_evicts_instance() {
        let mut hub = make_hub();
        let (conn, _rx) = make_connection(1);

        hub.on_connection_up(&conn);
        assert_eq!(hub.instance_count(), 1);

        hub.on_connection_down(DatapathId(1));
        assert_eq!(hub.instance_count(), 0);
    }

    #[test]
    fn test_one_instance_per_switch() {
        let mut hub = make_hub();
        let (conn1, mut rx1) = make_connection(1);
        let (conn2, mut rx2) = make_connection(2);

        hub.on_connection_up(&conn1);
        hub.on_connection_up(&conn2);

        assert_eq!(hub.instance_count(), 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_reconnect_reinstalls_on_new_session() {
        let mut hub = make_hub();
        let (stale, mut stale_rx) = make_connection(1);
        let (fresh, mut fresh_rx) = make_connection(1);

        hub.on_connection_up(&stale);
        stale_rx.try_recv().unwrap();

        hub.on_connection_down(DatapathId(1));
        hub.on_connection_up(&fresh);

        let msg = fresh_rx.try_recv().unwrap();
        assert_eq!(msg[1], MsgType::FlowMod as u8);
        assert!(stale_rx.try_recv().is_err());
        assert_eq!(hub.instance_count(), 1);
    }
}
