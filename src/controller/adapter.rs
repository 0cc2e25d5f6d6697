//! Event adapter binding the runtime's event stream to one policy

use crate::openflow::packet_in::PacketIn;
use crate::openflow::DatapathId;
use crate::runtime::SwitchConnection;
use crate::telemetry::MetricsRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed interface a policy implements
///
/// Handlers run on the dispatch task, one event at a time. They must
/// complete promptly and never block; everything behind them waits.
pub trait SwitchEvents {
    /// A switch finished its handshake
    fn on_connection_up(&mut self, conn: &SwitchConnection);
    /// A packet missed the switch's flow table
    fn on_packet_in(&mut self, conn: &SwitchConnection, pkt: &PacketIn<'_>);
    /// A switch connection was torn down
    fn on_connection_down(&mut self, datapath: DatapathId);
}

/// Per-connection bookkeeping around one policy
///
/// Tracks the live session for each attached datapath. A repeated
/// connection-up on the same session is ignored; a connection-up on a
/// fresh session for a known datapath means the switch reconnected
/// while its stale session lingered, and the new session supersedes it
/// (the policy sees a down for the old, then an up for the new). A
/// connection-down only evicts when it refers to the session currently
/// on record, so a stale session's teardown cannot tear down its
/// replacement. Packet-ins are forwarded regardless of the
/// bookkeeping; the runtime only reads them off live sessions.
pub struct EventAdapter<P> {
    policy: P,
    connected: HashMap<DatapathId, SwitchConnection>,
    metrics: Arc<MetricsRegistry>,
}

impl<P: SwitchEvents> EventAdapter<P> {
    pub fn new(policy: P, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            policy,
            connected: HashMap::new(),
            metrics,
        }
    }

    pub fn connection_up(&mut self, conn: &SwitchConnection) {
        if let Some(current) = self.connected.get(&conn.datapath()) {
            if current.same_session(conn) {
                warn!(
                    "duplicate connection-up for switch {}, ignored",
                    conn.datapath()
                );
                return;
            }
            warn!(
                "switch {} reconnected from {}, superseding its stale session",
                conn.datapath(),
                conn.peer()
            );
            self.policy.on_connection_down(conn.datapath());
        }
        self.connected.insert(conn.datapath(), conn.clone());
        self.metrics.set_active_switches(self.connected.len());
        self.policy.on_connection_up(conn);
    }

    pub fn packet_in(&mut self, conn: &SwitchConnection, pkt: &PacketIn<'_>) {
        if !self.connected.contains_key(&conn.datapath()) {
            debug!(
                "packet-in from switch {} before connection-up",
                conn.datapath()
            );
        }
        self.policy.on_packet_in(conn, pkt);
    }

    pub fn connection_down(&mut self, conn: &SwitchConnection) {
        match self.connected.get(&conn.datapath()) {
            Some(current) if current.same_session(conn) => {
                self.connected.remove(&conn.datapath());
                self.metrics.set_active_switches(self.connected.len());
                self.policy.on_connection_down(conn.datapath());
            }
            Some(_) => debug!(
                "stale connection-down for switch {}, already superseded",
                conn.datapath()
            ),
            None => warn!("connection-down for unknown switch {}", conn.datapath()),
        }
    }

    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    #[cfg(test)]
    fn policy(&self) -> &P {
        &self.policy
    }
}
