//! Packet extractor for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` as the single owned buffer. There is no parse
//! state besides the raw bytes: every [`PacketExtractor::can_extract`] call
//! decodes the header again from scratch, so "waiting for header" and
//! "waiting for payload" are derived, never stored.
//!
//! # Example
//!
//! ```
//! use vader_framer::protocol::{LengthHeader, PacketExtractor};
//!
//! let mut extractor = PacketExtractor::<LengthHeader>::new();
//!
//! extractor.append(&[0x02, 0, 0, 0, 0xAA]);
//! assert!(!extractor.can_extract());
//!
//! extractor.append(&[0xBB]);
//! assert!(extractor.can_extract());
//!
//! let packet = extractor.extract().unwrap();
//! assert_eq!(packet.payload(), &[0xAA, 0xBB]);
//! assert!(extractor.is_empty());
//! ```

use std::marker::PhantomData;
use std::ops::AddAssign;

use bytes::{Buf, BytesMut};

use super::header::WireHeader;
use super::packet::Packet;
use crate::error::{FramerError, Result};

/// Default initial buffer capacity (64KB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Buffer for accumulating incoming bytes and extracting complete packets.
///
/// Provides no internal synchronisation; callers feeding one extractor
/// from several threads must serialise access themselves.
#[derive(Debug)]
pub struct PacketExtractor<H> {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    _header: PhantomData<fn() -> H>,
}

impl<H: WireHeader> PacketExtractor<H> {
    /// Create a new extractor with the default capacity (64KB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a new extractor with a custom initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            _header: PhantomData,
        }
    }

    /// Check whether a complete packet is buffered.
    ///
    /// Returns false for an empty buffer, for a buffer too short to hold a
    /// header, and while the declared payload has not fully arrived.
    /// Never mutates the buffer.
    pub fn can_extract(&self) -> bool {
        if self.buffer.is_empty() {
            return false;
        }

        match H::decode(&self.buffer) {
            Ok(header) => {
                let Some(available) = self.buffer.len().checked_sub(H::SIZE) else {
                    return false;
                };
                tracing::trace!(
                    data_length = header.data_length(),
                    available,
                    "peeked header"
                );
                header.data_length() as u64 <= available as u64
            }
            Err(e) => {
                tracing::trace!("cannot peek header: {}", e);
                false
            }
        }
    }

    /// Extract one packet from the front of the buffer.
    ///
    /// Removes exactly `H::SIZE + data_length` bytes. Returns
    /// [`FramerError::Incomplete`] and leaves the buffer untouched if no
    /// complete packet is buffered.
    pub fn extract(&mut self) -> Result<Packet<H>> {
        let header = H::decode(&self.buffer).map_err(|e| {
            if e.is_too_short() {
                FramerError::Incomplete
            } else {
                e
            }
        })?;

        let data_length = header.data_length() as usize;
        match self.buffer.len().checked_sub(H::SIZE) {
            Some(available) if available >= data_length => {}
            _ => return Err(FramerError::Incomplete),
        }

        self.buffer.advance(H::SIZE);
        let payload = self.buffer.split_to(data_length).freeze();

        tracing::trace!(
            data_length,
            remaining = self.buffer.len(),
            "extracted packet"
        );

        Ok(Packet::new(header, payload))
    }

    /// Extract a packet if one is complete.
    pub fn try_extract(&mut self) -> Option<Packet<H>> {
        if self.can_extract() {
            self.extract().ok()
        } else {
            None
        }
    }

    /// Extract every complete packet, in arrival order.
    ///
    /// Bytes of a trailing partial packet stay buffered.
    pub fn drain(&mut self) -> impl Iterator<Item = Packet<H>> + '_ {
        std::iter::from_fn(move || self.try_extract())
    }

    /// Append data to the tail of the buffer. No size limit is enforced.
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Decode the header at the front of the buffer, if enough bytes are there.
    pub fn peek_header(&self) -> Option<H> {
        H::decode(&self.buffer).ok()
    }

    /// Payload length declared by the pending header, if decodable.
    pub fn pending_data_length(&self) -> Option<u32> {
        self.peek_header().map(|h| h.data_length())
    }

    /// Raw buffered bytes.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop every buffered byte, including any partial packet.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<H: WireHeader> Default for PacketExtractor<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: WireHeader> AddAssign<&[u8]> for PacketExtractor<H> {
    fn add_assign(&mut self, data: &[u8]) {
        self.append(data);
    }
}
