//! MRIM (Mail.Ru agent) header.
//!
//! Implements the 44-byte header format:
//! ```text
//! ┌────────┬────────┬────────┬────────┬────────┬────────┬──────────┬──────────┐
//! │ Magic  │ Proto  │ Seq    │ Msg    │ Length │ From   │ FromPort │ Reserved │
//! │ 4 bytes│ 4 bytes│ 4 bytes│ 4 bytes│ 4 bytes│ 4 bytes│ 4 bytes  │ 16 bytes │
//! └────────┴────────┴────────┴────────┴────────┴────────┴──────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Little Endian.

use super::header::{ensure_len, read_u32_le, WireHeader};
use crate::error::{FramerError, Result};

/// Header size in bytes (fixed, exactly 44).
pub const MRIM_HEADER_SIZE: usize = 44;

/// Magic value opening every MRIM packet.
pub const CS_MAGIC: u32 = 0xDEAD_BEEF;

/// Protocol version sent by default (1.21).
pub const PROTO_VERSION: u32 = (1 << 16) | 21;

/// Known command codes (`msg` field).
pub mod command {
    pub const HELLO: u32 = 0x1001;
    pub const HELLO_ACK: u32 = 0x1002;
    pub const LOGIN_ACK: u32 = 0x1004;
    pub const LOGIN_REJ: u32 = 0x1005;
    pub const PING: u32 = 0x1006;
    pub const MESSAGE: u32 = 0x1008;
    pub const MESSAGE_ACK: u32 = 0x1009;
    pub const USER_STATUS: u32 = 0x100F;
    pub const MESSAGE_RECV: u32 = 0x1011;
    pub const MESSAGE_STATUS: u32 = 0x1012;
    pub const LOGOUT: u32 = 0x1013;
    pub const USER_INFO: u32 = 0x1015;
    pub const ADD_CONTACT: u32 = 0x1019;
    pub const ADD_CONTACT_ACK: u32 = 0x101A;
    pub const OFFLINE_MESSAGE_ACK: u32 = 0x101D;
    pub const AUTHORIZE: u32 = 0x1020;
    pub const AUTHORIZE_ACK: u32 = 0x1021;
    pub const CONTACT_LIST2: u32 = 0x1037;
    pub const LOGIN2: u32 = 0x1038;

    /// Human-readable name of a command code, for logs.
    pub fn name(msg: u32) -> Option<&'static str> {
        let name = match msg {
            HELLO => "HELLO",
            HELLO_ACK => "HELLO_ACK",
            LOGIN_ACK => "LOGIN_ACK",
            LOGIN_REJ => "LOGIN_REJ",
            PING => "PING",
            MESSAGE => "MESSAGE",
            MESSAGE_ACK => "MESSAGE_ACK",
            USER_STATUS => "USER_STATUS",
            MESSAGE_RECV => "MESSAGE_RECV",
            MESSAGE_STATUS => "MESSAGE_STATUS",
            LOGOUT => "LOGOUT",
            USER_INFO => "USER_INFO",
            ADD_CONTACT => "ADD_CONTACT",
            ADD_CONTACT_ACK => "ADD_CONTACT_ACK",
            OFFLINE_MESSAGE_ACK => "OFFLINE_MESSAGE_ACK",
            AUTHORIZE => "AUTHORIZE",
            AUTHORIZE_ACK => "AUTHORIZE_ACK",
            CONTACT_LIST2 => "CONTACT_LIST2",
            LOGIN2 => "LOGIN2",
            _ => return None,
        };
        Some(name)
    }
}

/// Decoded MRIM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MrimHeader {
    /// Should equal [`CS_MAGIC`]; not checked while framing.
    pub magic: u32,
    /// Protocol version, major in the high 16 bits.
    pub proto: u32,
    /// Sequence number.
    pub seq: u32,
    /// Command code (see [`command`]).
    pub msg: u32,
    /// Payload length in bytes.
    pub data_length: u32,
    /// Sender IPv4 address, zero from clients.
    pub from: u32,
    /// Sender port, zero from clients.
    pub from_port: u32,
    /// Reserved, passed through.
    pub reserved: [u8; 16],
}

impl MrimHeader {
    /// Create a client header with the default magic and version.
    pub fn new(msg: u32, seq: u32, data_length: u32) -> Self {
        Self {
            magic: CS_MAGIC,
            proto: PROTO_VERSION,
            seq,
            msg,
            data_length,
            from: 0,
            from_port: 0,
            reserved: [0; 16],
        }
    }

    /// Validate the header for protocol compliance.
    ///
    /// Checks:
    /// - Magic is [`CS_MAGIC`]
    /// - Data length doesn't exceed `max_data_length`
    ///
    /// The framer never calls this; it is for the consuming protocol layer.
    pub fn validate(&self, max_data_length: u32) -> Result<()> {
        if self.magic != CS_MAGIC {
            return Err(FramerError::Protocol(format!(
                "Bad magic {:#010x}, expected {:#010x}",
                self.magic, CS_MAGIC
            )));
        }

        if self.data_length > max_data_length {
            return Err(FramerError::Protocol(format!(
                "Data length {} exceeds maximum {}",
                self.data_length, max_data_length
            )));
        }

        Ok(())
    }

    /// Major protocol version.
    #[inline]
    pub fn proto_major(&self) -> u16 {
        (self.proto >> 16) as u16
    }

    /// Minor protocol version.
    #[inline]
    pub fn proto_minor(&self) -> u16 {
        (self.proto & 0xFFFF) as u16
    }

    /// Command name, if known.
    #[inline]
    pub fn command_name(&self) -> Option<&'static str> {
        command::name(self.msg)
    }
}

impl WireHeader for MrimHeader {
    const SIZE: usize = MRIM_HEADER_SIZE;

    fn decode(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, Self::SIZE)?;
        let mut reserved = [0u8; 16];
        reserved.copy_from_slice(&buf[28..44]);
        Ok(Self {
            magic: read_u32_le(buf, 0),
            proto: read_u32_le(buf, 4),
            seq: read_u32_le(buf, 8),
            msg: read_u32_le(buf, 12),
            data_length: read_u32_le(buf, 16),
            from: read_u32_le(buf, 20),
            from_port: read_u32_le(buf, 24),
            reserved,
        })
    }

    fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= Self::SIZE);
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.proto.to_le_bytes());
        buf[8..12].copy_from_slice(&self.seq.to_le_bytes());
        buf[12..16].copy_from_slice(&self.msg.to_le_bytes());
        buf[16..20].copy_from_slice(&self.data_length.to_le_bytes());
        buf[20..24].copy_from_slice(&self.from.to_le_bytes());
        buf[24..28].copy_from_slice(&self.from_port.to_le_bytes());
        buf[28..44].copy_from_slice(&self.reserved);
    }

    #[inline]
    fn data_length(&self) -> u32 {
        self.data_length
    }
}
