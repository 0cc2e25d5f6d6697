//! Address-pair firewall policy
//!
//! Watches packet-ins and pushes a drop rule for any IPv4 packet whose
//! destination is blacklisted, unless the source is whitelisted.
//! Allowed traffic is left entirely alone: no rule, no packet-out,
//! nothing the switch would notice.

use super::address_list::AddressList;
use super::adapter::SwitchEvents;
use super::classifier::{classify, ClassifiedPacket};
use super::installer;
use crate::config::FirewallConfig;
use crate::openflow::flow_mod::{FlowMatch, FlowMod};
use crate::openflow::packet_in::PacketIn;
use crate::openflow::DatapathId;
use crate::runtime::SwitchConnection;
use crate::telemetry::MetricsRegistry;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// Priority for installed drop rules, well above the default
pub const DROP_PRIORITY: u16 = 0xff00;

/// Outcome of evaluating one classified packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Leave the packet to the switch; install nothing
    AllowSilent,
    /// Push a drop rule for this exact address pair
    InstallDropRule,
}

pub struct Firewall {
    blacklist: AddressList,
    whitelist: AddressList,
    idle_timeout: u16,
    hard_timeout: u16,
    metrics: Arc<MetricsRegistry>,
}

impl Firewall {
    pub fn new(
        blacklist: AddressList,
        whitelist: AddressList,
        idle_timeout: u16,
        hard_timeout: u16,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            blacklist,
            whitelist,
            idle_timeout,
            hard_timeout,
            metrics,
        }
    }

    /// Build from the `[firewall]` config section
    ///
    /// Fails on any malformed address; a firewall guessing at its lists
    /// is worse than no firewall.
    pub fn from_config(config: &FirewallConfig, metrics: Arc<MetricsRegistry>) -> Result<Self> {
        let blacklist = AddressList::parse(&config.blacklist)?;
        let whitelist = AddressList::parse(&config.whitelist)?;
        Ok(Self::new(
            blacklist,
            whitelist,
            config.idle_timeout,
            config.hard_timeout,
            metrics,
        ))
    }

    /// Decide what to do about one packet
    ///
    /// Pure and memoryless: the same packet always yields the same
    /// decision, and every blacklisted packet yields a fresh install.
    /// Suppressing repeats is the switch flow table's job.
    pub fn evaluate(&self, packet: &ClassifiedPacket) -> Decision {
        if self.blacklist.contains(packet.dst) && !self.whitelist.contains(packet.src) {
            Decision::InstallDropRule
        } else {
            Decision::AllowSilent
        }
    }

    /// Drop rule matching this packet's exact address pair
    pub fn drop_rule(&self, packet: &ClassifiedPacket) -> FlowMod {
        FlowMod {
            match_fields: FlowMatch {
                ether_type: Some(packet.ether_type),
                nw_src: Some(packet.src),
                nw_dst: Some(packet.dst),
            },
            idle_timeout: self.idle_timeout,
            hard_timeout: self.hard_timeout,
            priority: DROP_PRIORITY,
            ..Default::default()
        }
    }
}

impl SwitchEvents for Firewall {
    fn on_connection_up(&mut self, conn: &SwitchConnection) {
        info!("firewall watching switch {}", conn.datapath());
    }

    fn on_packet_in(&mut self, conn: &SwitchConnection, pkt: &PacketIn<'_>) {
        let Some(packet) = classify(pkt.frame()) else {
            trace!("packet-in from {} not applicable", conn.datapath());
            self.metrics.packets_ignored.inc();
            return;
        };

        match self.evaluate(&packet) {
            Decision::AllowSilent => {
                trace!("allowing {} -> {}", packet.src, packet.dst);
                self.metrics.packets_allowed.inc();
            }
            Decision::InstallDropRule => {
                info!(
                    "blocking {} -> {} on switch {}",
                    packet.src,
                    packet.dst,
                    conn.datapath()
                );
                let rule = self.drop_rule(&packet);
                match installer::install(conn, &rule) {
                    Ok(()) => self.metrics.drop_rules_installed.inc(),
                    Err(e) => error!(
                        "failed to install drop rule on {}: {}",
                        conn.datapath(),
                        e
                    ),
                }
            }
        }
    }

    fn on_connection_down(&mut self, datapath: DatapathId) {
        debug!("switch {} detached", datapath);
    }
}
