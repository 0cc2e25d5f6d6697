//! OpenFlow 1.0 constants and identifiers

use std::fmt;

/// Wire protocol version (OpenFlow 1.0)
pub const OFP_VERSION: u8 = 0x01;

/// Fixed message header size
pub const HEADER_SIZE: usize = 8;

/// buffer_id value meaning "not buffered"
pub const NO_BUFFER: u32 = 0xffff_ffff;

/// Flow priority used when none is chosen
pub const DEFAULT_PRIORITY: u16 = 0x8000;

/// Message type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    Hello = 0,
    Error = 1,
    EchoRequest = 2,
    EchoReply = 3,
    Vendor = 4,
    FeaturesRequest = 5,
    FeaturesReply = 6,
    GetConfigRequest = 7,
    GetConfigReply = 8,
    SetConfig = 9,
    PacketIn = 10,
    FlowRemoved = 11,
    PortStatus = 12,
    PacketOut = 13,
    FlowMod = 14,
    PortMod = 15,
    StatsRequest = 16,
    StatsReply = 17,
    BarrierRequest = 18,
    BarrierReply = 19,
}

impl MsgType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MsgType::Hello),
            1 => Some(MsgType::Error),
            2 => Some(MsgType::EchoRequest),
            3 => Some(MsgType::EchoReply),
            4 => Some(MsgType::Vendor),
            5 => Some(MsgType::FeaturesRequest),
            6 => Some(MsgType::FeaturesReply),
            7 => Some(MsgType::GetConfigRequest),
            8 => Some(MsgType::GetConfigReply),
            9 => Some(MsgType::SetConfig),
            10 => Some(MsgType::PacketIn),
            11 => Some(MsgType::FlowRemoved),
            12 => Some(MsgType::PortStatus),
            13 => Some(MsgType::PacketOut),
            14 => Some(MsgType::FlowMod),
            15 => Some(MsgType::PortMod),
            16 => Some(MsgType::StatsRequest),
            17 => Some(MsgType::StatsReply),
            18 => Some(MsgType::BarrierRequest),
            19 => Some(MsgType::BarrierReply),
            _ => None,
        }
    }
}

/// Reserved port numbers
pub mod port {
    /// Highest usable physical port number
    pub const MAX: u16 = 0xff00;
    /// Send back out the input port
    pub const IN_PORT: u16 = 0xfff8;
    pub const TABLE: u16 = 0xfff9;
    pub const NORMAL: u16 = 0xfffa;
    /// All physical ports except input and STP-disabled ones
    pub const FLOOD: u16 = 0xfffb;
    pub const ALL: u16 = 0xfffc;
    pub const CONTROLLER: u16 = 0xfffd;
    pub const LOCAL: u16 = 0xfffe;
    pub const NONE: u16 = 0xffff;
}

/// ofp_match wildcard bits
///
/// The nw_src/nw_dst fields are 6-bit mask lengths rather than single
/// bits: 0 means exact match, 32 or more wildcards the whole address.
pub mod wildcards {
    pub const IN_PORT: u32 = 1 << 0;
    pub const DL_VLAN: u32 = 1 << 1;
    pub const DL_SRC: u32 = 1 << 2;
    pub const DL_DST: u32 = 1 << 3;
    pub const DL_TYPE: u32 = 1 << 4;
    pub const NW_PROTO: u32 = 1 << 5;
    pub const TP_SRC: u32 = 1 << 6;
    pub const TP_DST: u32 = 1 << 7;
    pub const NW_SRC_SHIFT: u32 = 8;
    pub const NW_SRC_MASK: u32 = 0x3f << NW_SRC_SHIFT;
    pub const NW_DST_SHIFT: u32 = 14;
    pub const NW_DST_MASK: u32 = 0x3f << NW_DST_SHIFT;
    pub const DL_VLAN_PCP: u32 = 1 << 20;
    pub const NW_TOS: u32 = 1 << 21;
    /// Everything wildcarded
    pub const ALL: u32 = 0x003f_ffff;
}

/// Switch identity reported in FEATURES_REPLY
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatapathId(pub u64);

impl fmt::Debug for DatapathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Display for DatapathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_from_u8() {
        assert_eq!(MsgType::from_u8(0), Some(MsgType::Hello));
        assert_eq!(MsgType::from_u8(10), Some(MsgType::PacketIn));
        assert_eq!(MsgType::from_u8(14), Some(MsgType::FlowMod));
        assert_eq!(MsgType::from_u8(19), Some(MsgType::BarrierReply));
        assert_eq!(MsgType::from_u8(20), None);
    }

    #[test]
    fn test_datapath_id_display() {
        let dpid = DatapathId(0x00_00_00_00_00_00_00_01);
        assert_eq!(format!("{}", dpid), "0000000000000001");

        let dpid = DatapathId(0xdead_beef_cafe_f00d);
        assert_eq!(format!("{}", dpid), "deadbeefcafef00d");
    }

    #[test]
    fn test_wildcards_all_covers_fields() {
        let combined = wildcards::IN_PORT
            | wildcards::DL_VLAN
            | wildcards::DL_SRC
            | wildcards::DL_DST
            | wildcards::DL_TYPE
            | wildcards::NW_PROTO
            | wildcards::TP_SRC
            | wildcards::TP_DST
            | wildcards::NW_SRC_MASK
            | wildcards::NW_DST_MASK
            | wildcards::DL_VLAN_PCP
            | wildcards::NW_TOS;
        assert_eq!(combined, wildcards::ALL);
    }
}
