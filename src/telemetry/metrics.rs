//! Metrics collection for controller activity
//!
//! Thread-safe counters shared between the session tasks and the
//! dispatch loop; a periodic timer logs the exported snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increments the counter by 1.
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds a value to the counter.
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Gets the current value of the counter.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Global metrics registry for the controller.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    // Session metrics
    /// Connections accepted from switches.
    pub connections_accepted: Counter,
    /// Connections dropped during the handshake.
    pub handshake_failures: Counter,
    /// PACKET_IN messages received.
    pub packet_ins: Counter,
    /// Messages that failed to write to a switch.
    pub send_errors: Counter,

    // Policy metrics
    /// Packet-ins left alone by the firewall.
    pub packets_allowed: Counter,
    /// Packet-ins no policy applied to (non-IPv4).
    pub packets_ignored: Counter,
    /// Drop rules pushed by the firewall.
    pub drop_rules_installed: Counter,
    /// Flood rules pushed by the hub.
    pub flood_rules_installed: Counter,

    /// Current number of attached switches (gauge).
    pub active_switches: AtomicU64,
}

impl MetricsRegistry {
    /// Creates a new metrics registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the attached-switch gauge.
    pub fn set_active_switches(&self, count: usize) {
        self.active_switches.store(count as u64, Ordering::Relaxed);
    }

    /// Exports all metrics as key-value pairs.
    pub fn export(&self) -> Vec<(String, u64)> {
        vec![
            (
                "connections_accepted".into(),
                self.connections_accepted.get(),
            ),
            ("handshake_failures".into(), self.handshake_failures.get()),
            ("packet_ins".into(), self.packet_ins.get()),
            ("send_errors".into(), self.send_errors.get()),
            ("packets_allowed".into(), self.packets_allowed.get()),
            ("packets_ignored".into(), self.packets_ignored.get()),
            (
                "drop_rules_installed".into(),
                self.drop_rules_installed.get(),
            ),
            (
                "flood_rules_installed".into(),
                self.flood_rules_installed.get(),
            ),
            (
                "active_switches".into(),
                self.active_switches.load(Ordering::Relaxed),
            ),
        ]
    }
}
