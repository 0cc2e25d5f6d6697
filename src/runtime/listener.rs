//! Listener and per-switch session handling
//!
//! Each accepted switch gets its own session task for socket I/O, but
//! every policy callback runs on the single dispatch loop inside
//! [`serve`], so policies see events one at a time and never need
//! internal locking.

use crate::controller::{EventAdapter, SwitchEvents};
use crate::error::{Error, Result};
use crate::openflow::message::{self, ErrorMsg, FeaturesReply, Header};
use crate::openflow::packet_in::PacketIn;
use crate::openflow::{MsgType, HEADER_SIZE, OFP_VERSION};
use crate::runtime::SwitchConnection;
use crate::telemetry::MetricsRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// How often counters are dumped to the debug log
const STATS_INTERVAL_SECS: u64 = 60;

/// Handshake transaction ids; session xids start above these
const HELLO_XID: u32 = 0;
const FEATURES_XID: u32 = 1;

/// Events flowing from session tasks to the dispatch loop
///
/// ConnectionDown carries the session's own handle so the dispatch
/// loop can tell a stale session's teardown from the live one.
#[derive(Debug)]
pub(crate) enum Event {
    ConnectionUp(SwitchConnection),
    PacketIn(SwitchConnection, Vec<u8>),
    ConnectionDown(SwitchConnection),
}

/// Accept and serve switch connections until ctrl-c
pub async fn serve<P: SwitchEvents>(
    listener: TcpListener,
    policy: P,
    metrics: Arc<MetricsRegistry>,
) -> Result<()> {
    let mut adapter = EventAdapter::new(policy, metrics.clone());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut stats_timer = tokio::time::interval(Duration::from_secs(STATS_INTERVAL_SECS));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        metrics.connections_accepted.inc();
                        debug!("accepted connection from {}", peer);
                        tokio::spawn(run_session(
                            stream,
                            peer,
                            event_tx.clone(),
                            metrics.clone(),
                        ));
                    }
                    Err(e) => warn!("accept failed: {}", e),
                }
            }
            Some(event) = event_rx.recv() => {
                dispatch(&mut adapter, event);
            }
            _ = stats_timer.tick() => {
                for (name, value) in metrics.export() {
                    debug!("stats {}={}", name, value);
                }
            }
            _ = &mut shutdown => {
                info!("shutting down, {} switches connected", adapter.connected_count());
                break;
            }
        }
    }

    Ok(())
}

fn dispatch<P: SwitchEvents>(adapter: &mut EventAdapter<P>, event: Event) {
    match event {
        Event::ConnectionUp(conn) => adapter.connection_up(&conn),
        Event::PacketIn(conn, msg) => match PacketIn::parse(&msg) {
            Ok(pkt) => {
                trace!(
                    "packet-in from switch {} port {} (reason {}, buffer 0x{:08x}, {} of {} bytes)",
                    conn.datapath(),
                    pkt.in_port(),
                    pkt.reason(),
                    pkt.buffer_id(),
                    pkt.frame().len(),
                    pkt.total_len()
                );
                adapter.packet_in(&conn, &pkt);
            }
            Err(e) => warn!("malformed PACKET_IN from switch {}: {}", conn.datapath(), e),
        },
        Event::ConnectionDown(conn) => adapter.connection_down(&conn),
    }
}

/// Drive one switch socket from handshake to disconnect
async fn run_session(
    mut stream: TcpStream,
    peer: SocketAddr,
    events: mpsc::UnboundedSender<Event>,
    metrics: Arc<MetricsRegistry>,
) {
    let features = match handshake(&mut stream, peer).await {
        Ok(f) => f,
        Err(e) => {
            metrics.handshake_failures.inc();
            warn!("handshake with {} failed: {}", peer, e);
            return;
        }
    };

    let datapath = features.datapath_id;
    info!(
        "switch {} connected from {} ({} tables, {} buffers, capabilities 0x{:08x})",
        datapath, peer, features.n_tables, features.n_buffers, features.capabilities
    );

    let (mut reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    let writer_metrics = metrics.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = writer.write_all(&msg).await {
                writer_metrics.send_errors.inc();
                debug!("write to switch failed: {}", e);
                break;
            }
        }
    });

    let conn = SwitchConnection::new(datapath, peer, tx);
    if events.send(Event::ConnectionUp(conn.clone())).is_err() {
        // Dispatch loop is gone, the controller is shutting down
        return;
    }

    loop {
        let (header, msg) = match read_message(&mut reader).await {
            Ok(m) => m,
            Err(e) => {
                debug!("switch {} read ended: {}", datapath, e);
                break;
            }
        };

        match MsgType::from_u8(header.msg_type) {
            Some(MsgType::PacketIn) => {
                metrics.packet_ins.inc();
                if events.send(Event::PacketIn(conn.clone(), msg)).is_err() {
                    return;
                }
            }
            Some(MsgType::EchoRequest) => {
                // Keepalive, answered here so a busy dispatch loop
                // cannot time the switch out
                if conn
                    .send(message::echo_reply(header.xid, &msg[HEADER_SIZE..]))
                    .is_err()
                {
                    break;
                }
            }
            Some(MsgType::Error) => match ErrorMsg::parse(&msg) {
                Ok(err) => warn!(
                    "switch {} reported error type {} code {} for xid {}",
                    datapath, err.err_type, err.code, header.xid
                ),
                Err(e) => warn!("switch {} sent malformed ERROR: {}", datapath, e),
            },
            Some(other) => trace!("ignoring {:?} from switch {}", other, datapath),
            None => trace!(
                "ignoring unknown message type {} from switch {}",
                header.msg_type,
                datapath
            ),
        }
    }

    let _ = events.send(Event::ConnectionDown(conn));
}

/// HELLO and feature discovery, in that order
///
/// The switch may interleave echo requests before its FEATURES_REPLY;
/// those are answered inline.
async fn handshake<S>(stream: &mut S, peer: SocketAddr) -> Result<FeaturesReply>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(&message::hello(HELLO_XID)).await?;

    let (header, _) = read_message(stream).await?;
    if header.msg_type != MsgType::Hello as u8 {
        return Err(Error::Handshake(format!(
            "expected HELLO from {}, got message type {}",
            peer, header.msg_type
        )));
    }
    if header.version < OFP_VERSION {
        return Err(Error::Handshake(format!(
            "switch {} speaks version 0x{:02x}, need at least 0x{:02x}",
            peer, header.version, OFP_VERSION
        )));
    }

    stream.write_all(&message::features_request(FEATURES_XID)).await?;

    loop {
        let (header, msg) = read_message(stream).await?;
        match MsgType::from_u8(header.msg_type) {
            Some(MsgType::FeaturesReply) => return FeaturesReply::parse(&msg),
            Some(MsgType::EchoRequest) => {
                stream
                    .write_all(&message::echo_reply(header.xid, &msg[HEADER_SIZE..]))
                    .await?;
            }
            Some(MsgType::Error) => {
                let err = ErrorMsg::parse(&msg)?;
                return Err(Error::Handshake(format!(
                    "switch {} reported error type {} code {}",
                    peer, err.err_type, err.code
                )));
            }
            _ => trace!(
                "ignoring message type {} during handshake with {}",
                header.msg_type,
                peer
            ),
        }
    }
}

/// Read one length-delimited message off the wire
async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(Header, Vec<u8>)> {
    let mut head = [0u8; HEADER_SIZE];
    reader.read_exact(&mut head).await?;

    let header = Header::parse(&head)?;
    let length = header.length as usize;
    if length < HEADER_SIZE {
        return Err(Error::Parse(format!(
            "message length {} below header size",
            length
        )));
    }

    let mut msg = vec![0u8; length];
    msg[..HEADER_SIZE].copy_from_slice(&head);
    reader.read_exact(&mut msg[HEADER_SIZE..]).await?;
    Ok((header, msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openflow::message::FEATURES_REPLY_SIZE;
    use crate::openflow::DatapathId;

    fn make_features_reply(dpid: u64) -> Vec<u8> {
        let mut msg = Vec::new();
        Header::new(MsgType::FeaturesReply, FEATURES_REPLY_SIZE as u16, 1).encode_into(&mut msg);
        msg.extend_from_slice(&dpid.to_be_bytes());
        msg.extend_from_slice(&256u32.to_be_bytes()); // n_buffers
        msg.push(1); // n_tables
        msg.extend_from_slice(&[0u8; 3]); // pad
        msg.extend_from_slice(&0u32.to_be_bytes()); // capabilities
        msg.extend_from_slice(&0u32.to_be_bytes()); // actions
        msg
    }

    #[tokio::test]
    async fn test_read_message_returns_full_message() {
        let (mut tx, mut rx) = tokio::io::duplex(1024);
        let sent = message::echo_reply(5, &[0xaa, 0xbb]);
        tx.write_all(&sent).await.unwrap();

        let (header, msg) = read_message(&mut rx).await.unwrap();
        assert_eq!(header.msg_type, MsgType::EchoReply as u8);
        assert_eq!(header.xid, 5);
        assert_eq!(msg, sent);
    }

    #[tokio::test]
    async fn test_read_message_rejects_undersized_length() {
        let (mut tx, mut rx) = tokio::io::duplex(1024);
        tx.write_all(&[0x01, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00])
            .await
            .unwrap();

        let err = read_message(&mut rx).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_read_message_eof_mid_header() {
        let (mut tx, mut rx) = tokio::io::duplex(1024);
        tx.write_all(&[0x01, 0x0a, 0x00]).await.unwrap();
        drop(tx);

        let err = read_message(&mut rx).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_handshake_exchanges_hello_and_features() {
        let (mut controller, mut switch) = tokio::io::duplex(1024);
        let peer: SocketAddr = "127.0.0.1:1".parse().unwrap();

        let switch_task = tokio::spawn(async move {
            let (header, _) = read_message(&mut switch).await.unwrap();
            assert_eq!(header.msg_type, MsgType::Hello as u8);
            switch.write_all(&message::hello(0)).await.unwrap();

            let (header, _) = read_message(&mut switch).await.unwrap();
            assert_eq!(header.msg_type, MsgType::FeaturesRequest as u8);
            switch.write_all(&make_features_reply(7)).await.unwrap();
            switch
        });

        let features = handshake(&mut controller, peer).await.unwrap();
        assert_eq!(features.datapath_id, DatapathId(7));
        switch_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_answers_echo_before_features() {
        let (mut controller, mut switch) = tokio::io::duplex(1024);
        let peer: SocketAddr = "127.0.0.1:1".parse().unwrap();

        let switch_task = tokio::spawn(async move {
            let _ = read_message(&mut switch).await.unwrap(); // HELLO
            switch.write_all(&message::hello(0)).await.unwrap();
            let _ = read_message(&mut switch).await.unwrap(); // FEATURES_REQUEST

            // Interleave a keepalive before answering
            let mut echo = Vec::new();
            Header::new(MsgType::EchoRequest, 8, 99).encode_into(&mut echo);
            switch.write_all(&echo).await.unwrap();

            let (reply, _) = read_message(&mut switch).await.unwrap();
            assert_eq!(reply.msg_type, MsgType::EchoReply as u8);
            assert_eq!(reply.xid, 99);

            switch.write_all(&make_features_reply(3)).await.unwrap();
        });

        let features = handshake(&mut controller, peer).await.unwrap();
        assert_eq!(features.datapath_id, DatapathId(3));
        switch_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_rejects_non_hello() {
        let (mut controller, mut switch) = tokio::io::duplex(1024);
        let peer: SocketAddr = "127.0.0.1:1".parse().unwrap();

        tokio::spawn(async move {
            let _ = read_message(&mut switch).await.unwrap();
            let mut echo = Vec::new();
            Header::new(MsgType::EchoRequest, 8, 0).encode_into(&mut echo);
            switch.write_all(&echo).await.unwrap();
            switch
        });

        let err = handshake(&mut controller, peer).await.unwrap_err();
        assert!(matches!(err, Error::Handshake(_)));
    }

    #[tokio::test]
    async fn test_handshake_rejects_older_version() {
        let (mut controller, mut switch) = tokio::io::duplex(1024);
        let peer: SocketAddr = "127.0.0.1:1".parse().unwrap();

        tokio::spawn(async move {
            let _ = read_message(&mut switch).await.unwrap();
            // HELLO with version 0x00
            switch
                .write_all(&[0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00])
                .await
                .unwrap();
            switch
        });

        let err = handshake(&mut controller, peer).await.unwrap_err();
        assert!(matches!(err, Error::Handshake(_)));
    }
}
