//! Message header and control messages

use super::types::{DatapathId, MsgType, HEADER_SIZE, OFP_VERSION};
use crate::{Error, Result};

/// Fixed 8-byte message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub msg_type: u8,
    /// Total message length including this header
    pub length: u16,
    pub xid: u32,
}

impl Header {
    pub fn new(msg_type: MsgType, length: u16, xid: u32) -> Self {
        Self {
            version: OFP_VERSION,
            msg_type: msg_type as u8,
            length,
            xid,
        }
    }

    pub fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < HEADER_SIZE {
            return Err(Error::Parse("message header too short".into()));
        }
        Ok(Self {
            version: buffer[0],
            msg_type: buffer[1],
            length: u16::from_be_bytes([buffer[2], buffer[3]]),
            xid: u32::from_be_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]),
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.version);
        out.push(self.msg_type);
        out.extend_from_slice(&self.length.to_be_bytes());
        out.extend_from_slice(&self.xid.to_be_bytes());
    }
}

/// HELLO message
pub fn hello(xid: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    Header::new(MsgType::Hello, HEADER_SIZE as u16, xid).encode_into(&mut buf);
    buf
}

/// FEATURES_REQUEST message
pub fn features_request(xid: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    Header::new(MsgType::FeaturesRequest, HEADER_SIZE as u16, xid).encode_into(&mut buf);
    buf
}

/// ECHO_REPLY message carrying back the request payload
pub fn echo_reply(xid: u32, payload: &[u8]) -> Vec<u8> {
    let length = HEADER_SIZE + payload.len();
    let mut buf = Vec::with_capacity(length);
    Header::new(MsgType::EchoReply, length as u16, xid).encode_into(&mut buf);
    buf.extend_from_slice(payload);
    buf
}

/// FEATURES_REPLY fixed part size (port descriptions follow)
pub const FEATURES_REPLY_SIZE: usize = 32;

/// Parsed FEATURES_REPLY
///
/// Only the fixed part is read; the trailing port descriptions are
/// irrelevant to flow programming and skipped.
#[derive(Debug, Clone, Copy)]
pub struct FeaturesReply {
    pub datapath_id: DatapathId,
    pub n_buffers: u32,
    pub n_tables: u8,
    pub capabilities: u32,
}

impl FeaturesReply {
    pub fn parse(message: &[u8]) -> Result<Self> {
        let header = Header::parse(message)?;
        if header.msg_type != MsgType::FeaturesReply as u8 {
            return Err(Error::Parse(format!(
                "expected FEATURES_REPLY, got message type {}",
                header.msg_type
            )));
        }
        if message.len() < FEATURES_REPLY_SIZE {
            return Err(Error::Parse("FEATURES_REPLY too short".into()));
        }
        Ok(Self {
            datapath_id: DatapathId(u64::from_be_bytes(
                message[8..16].try_into().unwrap(),
            )),
            n_buffers: u32::from_be_bytes(message[16..20].try_into().unwrap()),
            n_tables: message[20],
            capabilities: u32::from_be_bytes(message[24..28].try_into().unwrap()),
        })
    }
}

/// Parsed ERROR message (type and code; the offending data is ignored)
#[derive(Debug, Clone, Copy)]
pub struct ErrorMsg {
    pub err_type: u16,
    pub code: u16,
}

impl ErrorMsg {
    pub fn parse(message: &[u8]) -> Result<Self> {
        if message.len() < HEADER_SIZE + 4 {
            return Err(Error::Parse("ERROR message too short".into()));
        }
        Ok(Self {
            err_type: u16::from_be_bytes([message[8], message[9]]),
            code: u16::from_be_bytes([message[10], message[11]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = Header::new(MsgType::Hello, 8, 42);
        let mut buf = Vec::new();
        header.encode_into(&mut buf);
        assert_eq!(buf, [0x01, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x2a]);

        let parsed = Header::parse(&buf).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_parse_too_short() {
        assert!(Header::parse(&[0x01, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_hello_encoding() {
        assert_eq!(hello(0), [0x01, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_echo_reply_carries_payload() {
        let msg = echo_reply(7, &[0xab, 0xcd]);
        assert_eq!(msg.len(), 10);
        assert_eq!(msg[1], MsgType::EchoReply as u8);
        assert_eq!(&msg[2..4], &[0x00, 0x0a]); // length 10
        assert_eq!(&msg[8..], &[0xab, 0xcd]);
    }

    fn make_features_reply(dpid: u64) -> Vec<u8> {
        let mut msg = Vec::new();
        Header::new(MsgType::FeaturesReply, FEATURES_REPLY_SIZE as u16, 1).encode_into(&mut msg);
        msg.extend_from_slice(&dpid.to_be_bytes());
        msg.extend_from_slice(&256u32.to_be_bytes()); // n_buffers
        msg.push(2); // n_tables
        msg.extend_from_slice(&[0u8; 3]); // pad
        msg.extend_from_slice(&0x87u32.to_be_bytes()); // capabilities
        msg.extend_from_slice(&0xfffu32.to_be_bytes()); // actions
        msg
    }

    #[test]
    fn test_features_reply_parse() {
        let msg = make_features_reply(0x0000_0000_0000_002a);
        let reply = FeaturesReply::parse(&msg).unwrap();
        assert_eq!(reply.datapath_id, DatapathId(42));
        assert_eq!(reply.n_buffers, 256);
        assert_eq!(reply.n_tables, 2);
        assert_eq!(reply.capabilities, 0x87);
    }

    #[test]
    fn test_features_reply_wrong_type() {
        let mut msg = make_features_reply(1);
        msg[1] = MsgType::EchoReply as u8;
        assert!(FeaturesReply::parse(&msg).is_err());
    }

    #[test]
    fn test_features_reply_truncated() {
        let msg = make_features_reply(1);
        assert!(FeaturesReply::parse(&msg[..20]).is_err());
    }

    #[test]
    fn test_error_msg_parse() {
        let mut msg = Vec::new();
        Header::new(MsgType::Error, 12, 3).encode_into(&mut msg);
        msg.extend_from_slice(&3u16.to_be_bytes()); // OFPET_FLOW_MOD_FAILED
        msg.extend_from_slice(&2u16.to_be_bytes()); // OFPFMFC_EPERM
        let err = ErrorMsg::parse(&msg).unwrap();
        assert_eq!(err.err_type, 3);
        assert_eq!(err.code, 2);
    }
}
