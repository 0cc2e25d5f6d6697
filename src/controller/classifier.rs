//! Packet classification for policy evaluation

use crate::protocol::ethernet::Frame;
use crate::protocol::ipv4::Ipv4Header;
use crate::protocol::EtherType;
use std::net::Ipv4Addr;

/// Address fields extracted from one packet-in frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedPacket {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub ether_type: u16,
}

/// Extract the IPv4 address pair from a raw frame
///
/// Returns `None` when no policy applies: non-IPv4 ethertypes (ARP,
/// IPv6, VLAN-tagged frames) and frames too mangled to parse. That is
/// the normal outcome for most broadcast traffic, not an error, and
/// nothing is logged here.
pub fn classify(payload: &[u8]) -> Option<ClassifiedPacket> {
    let frame = Frame::parse(payload).ok()?;
    if frame.ethertype() != EtherType::Ipv4 as u16 {
        return None;
    }
    let header = Ipv4Header::parse(frame.payload()).ok()?;
    Some(ClassifiedPacket {
        src: header.src_addr(),
        dst: header.dst_addr(),
        ether_type: EtherType::Ipv4 as u16,
    })
}
