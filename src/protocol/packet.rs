//! Packet struct: a decoded header plus its payload.
//!
//! Uses `bytes::Bytes` so payloads split off the extractor buffer are
//! shared rather than copied.
//!
//! # Example
//!
//! ```
//! use vader_framer::protocol::{LengthHeader, Packet};
//! use bytes::Bytes;
//!
//! let packet = Packet::new(LengthHeader::new(2), Bytes::from_static(&[0xAA, 0xBB]));
//!
//! assert_eq!(packet.data_length(), 2);
//! assert_eq!(packet.payload(), &[0xAA, 0xBB]);
//! ```

use bytes::Bytes;

use super::header::WireHeader;

/// A complete packet ("half packet" in MRIM terms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet<H> {
    /// Decoded header.
    pub header: H,
    /// Payload bytes.
    pub payload: Bytes,
}

impl<H: WireHeader> Packet<H> {
    /// Create a new packet from header and payload.
    pub fn new(header: H, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Create a packet from header and raw bytes (copies data).
    pub fn from_parts(header: H, payload: &[u8]) -> Self {
        Self {
            header,
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Declared payload length from the header.
    #[inline]
    pub fn data_length(&self) -> u32 {
        self.header.data_length()
    }

    /// Total size on the wire (header + payload).
    #[inline]
    pub fn wire_len(&self) -> usize {
        H::SIZE + self.payload.len()
    }

    /// Encode the packet back to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        build_packet(&self.header, &self.payload)
    }
}

/// Build wire bytes from a header and payload.
///
/// The header is written as given; keeping its data length in sync with
/// `payload` is the caller's job.
pub fn build_packet<H: WireHeader>(header: &H, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; H::SIZE + payload.len()];
    header.encode_into(&mut buf[..H::SIZE]);
    buf[H::SIZE..].copy_from_slice(payload);
    buf
}
