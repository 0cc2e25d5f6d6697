//! PACKET_IN decoding

use super::message::Header;
use super::types::MsgType;
use crate::{Error, Result};

/// Offset of the frame bytes within the message
pub const DATA_OFFSET: usize = 18;

/// Reason codes
pub mod reason {
    pub const NO_MATCH: u8 = 0;
    pub const ACTION: u8 = 1;
}

/// Parsed PACKET_IN (zero-copy reference)
#[derive(Debug)]
pub struct PacketIn<'a> {
    buffer: &'a [u8],
}

impl<'a> PacketIn<'a> {
    /// Parse a complete PACKET_IN message, header included
    pub fn parse(message: &'a [u8]) -> Result<Self> {
        let header = Header::parse(message)?;
        if header.msg_type != MsgType::PacketIn as u8 {
            return Err(Error::Parse(format!(
                "expected PACKET_IN, got message type {}",
                header.msg_type
            )));
        }
        if message.len() < DATA_OFFSET {
            return Err(Error::Parse("PACKET_IN too short".into()));
        }
        Ok(Self { buffer: message })
    }

    pub fn buffer_id(&self) -> u32 {
        u32::from_be_bytes(self.buffer[8..12].try_into().unwrap())
    }

    /// Full length of the frame on the wire (may exceed what was sent)
    pub fn total_len(&self) -> u16 {
        u16::from_be_bytes([self.buffer[12], self.buffer[13]])
    }

    pub fn in_port(&self) -> u16 {
        u16::from_be_bytes([self.buffer[14], self.buffer[15]])
    }

    pub fn reason(&self) -> u8 {
        self.buffer[16]
    }

    /// Frame bytes carried in the message
    pub fn frame(&self) -> &[u8] {
        &self.buffer[DATA_OFFSET..]
    }
}
