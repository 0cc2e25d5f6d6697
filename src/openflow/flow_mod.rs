//! FLOW_MOD construction and encoding

use super::message::Header;
use super::types::{port, wildcards, MsgType, DEFAULT_PRIORITY, NO_BUFFER};
use std::net::Ipv4Addr;

/// ofp_match size on the wire
pub const MATCH_SIZE: usize = 40;

/// Fixed FLOW_MOD size: header, match and body without actions
pub const FLOW_MOD_SIZE: usize = 72;

/// Flow table commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum FlowModCommand {
    #[default]
    Add = 0,
    Modify = 1,
    ModifyStrict = 2,
    Delete = 3,
    DeleteStrict = 4,
}

/// Match fields the controller programs
///
/// Unset fields are wildcarded. Addresses match exactly; no mask
/// lengths are exposed here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowMatch {
    pub ether_type: Option<u16>,
    pub nw_src: Option<Ipv4Addr>,
    pub nw_dst: Option<Ipv4Addr>,
}

impl FlowMatch {
    /// True when a network address field is set
    pub fn has_network_fields(&self) -> bool {
        self.nw_src.is_some() || self.nw_dst.is_some()
    }

    /// Wildcard bits for the unset fields
    pub fn wildcard_bits(&self) -> u32 {
        let mut bits = wildcards::ALL;
        if self.ether_type.is_some() {
            bits &= !wildcards::DL_TYPE;
        }
        if self.nw_src.is_some() {
            bits &= !wildcards::NW_SRC_MASK;
        }
        if self.nw_dst.is_some() {
            bits &= !wildcards::NW_DST_MASK;
        }
        bits
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.wildcard_bits().to_be_bytes());
        out.extend_from_slice(&[0u8; 2]); // in_port
        out.extend_from_slice(&[0u8; 6]); // dl_src
        out.extend_from_slice(&[0u8; 6]); // dl_dst
        out.extend_from_slice(&[0u8; 2]); // dl_vlan
        out.push(0); // dl_vlan_pcp
        out.push(0); // pad
        out.extend_from_slice(&self.ether_type.unwrap_or(0).to_be_bytes());
        out.push(0); // nw_tos
        out.push(0); // nw_proto
        out.extend_from_slice(&[0u8; 2]); // pad
        let nw_src = self.nw_src.unwrap_or(Ipv4Addr::UNSPECIFIED);
        let nw_dst = self.nw_dst.unwrap_or(Ipv4Addr::UNSPECIFIED);
        out.extend_from_slice(&u32::from(nw_src).to_be_bytes());
        out.extend_from_slice(&u32::from(nw_dst).to_be_bytes());
        out.extend_from_slice(&[0u8; 2]); // tp_src
        out.extend_from_slice(&[0u8; 2]); // tp_dst
    }
}

/// Flow actions
///
/// Output is the only action the controller installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Forward to a port, physical or reserved
    Output { port: u16 },
}

impl FlowAction {
    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        match self {
            FlowAction::Output { .. } => 8,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            FlowAction::Output { port } => {
                out.extend_from_slice(&[0u8; 2]); // OFPAT_OUTPUT
                out.extend_from_slice(&8u16.to_be_bytes()); // length
                out.extend_from_slice(&port.to_be_bytes());
                out.extend_from_slice(&0xffffu16.to_be_bytes()); // max_len
            }
        }
    }
}

/// Flow table modification message
///
/// An empty action list drops matching packets.
#[derive(Debug, Clone)]
pub struct FlowMod {
    pub match_fields: FlowMatch,
    pub cookie: u64,
    pub command: FlowModCommand,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub buffer_id: Option<u32>,
    pub actions: Vec<FlowAction>,
}

impl Default for FlowMod {
    fn default() -> Self {
        Self {
            match_fields: FlowMatch::default(),
            cookie: 0,
            command: FlowModCommand::Add,
            idle_timeout: 0,
            hard_timeout: 0,
            priority: DEFAULT_PRIORITY,
            buffer_id: None,
            actions: Vec::new(),
        }
    }
}

impl FlowMod {
    /// Encode as a complete message
    pub fn encode(&self, xid: u32) -> Vec<u8> {
        let length = FLOW_MOD_SIZE + self.actions.iter().map(FlowAction::size).sum::<usize>();
        let mut buf = Vec::with_capacity(length);
        Header::new(MsgType::FlowMod, length as u16, xid).encode_into(&mut buf);
        self.match_fields.encode_into(&mut buf);
        buf.extend_from_slice(&self.cookie.to_be_bytes());
        buf.extend_from_slice(&(self.command as u16).to_be_bytes());
        buf.extend_from_slice(&self.idle_timeout.to_be_bytes());
        buf.extend_from_slice(&self.hard_timeout.to_be_bytes());
        buf.extend_from_slice(&self.priority.to_be_bytes());
        buf.extend_from_slice(&self.buffer_id.unwrap_or(NO_BUFFER).to_be_bytes());
        buf.extend_from_slice(&port::NONE.to_be_bytes()); // out_port
        buf.extend_from_slice(&[0u8; 2]); // flags
        for action in &self.actions {
            action.encode_into(&mut buf);
        }
        buf
    }
}
