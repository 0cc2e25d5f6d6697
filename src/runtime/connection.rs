//! Switch connection handle

use crate::openflow::DatapathId;
use crate::{Error, Result};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// First xid handed out to callers; 0 and 1 are spent by the session
/// handshake (HELLO and FEATURES_REQUEST)
const FIRST_XID: u32 = 2;

/// Handle to one connected switch
///
/// Cheap to clone. Sends queue onto the connection's writer task
/// without blocking; when the transport drops, the channel closes and
/// sends fail with `ConnectionClosed`.
#[derive(Debug, Clone)]
pub struct SwitchConnection {
    datapath: DatapathId,
    peer: SocketAddr,
    tx: mpsc::UnboundedSender<Vec<u8>>,
    xid: Arc<AtomicU32>,
}

impl SwitchConnection {
    pub(crate) fn new(
        datapath: DatapathId,
        peer: SocketAddr,
        tx: mpsc::UnboundedSender<Vec<u8>>,
    ) -> Self {
        Self {
            datapath,
            peer,
            tx,
            xid: Arc::new(AtomicU32::new(FIRST_XID)),
        }
    }

    pub fn datapath(&self) -> DatapathId {
        self.datapath
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Whether two handles refer to the same underlying session
    ///
    /// A switch that reconnects gets a new session and a new handle,
    /// even though the datapath id is unchanged.
    pub fn same_session(&self, other: &SwitchConnection) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// Transaction id for the next outgoing message
    pub fn next_xid(&self) -> u32 {
        self.xid.fetch_add(1, Ordering::Relaxed)
    }

    /// Queue an encoded message for transmission
    pub fn send(&self, message: Vec<u8>) -> Result<()> {
        self.tx.send(message).map_err(|_| Error::ConnectionClosed {
            datapath: self.datapath.to_string(),
        })
    }
}
