//! Fixed-size header decoding.
//!
//! A [`WireHeader`] is the fixed-layout prefix of every packet. The only
//! field the framer cares about is the declared payload length; everything
//! else is passed through to the protocol layer untouched.
//!
//! The simplest layout is [`LengthHeader`]:
//! ```text
//! ┌──────────────┐
//! │ Data length  │
//! │ 4 bytes      │
//! │ uint32 LE    │
//! └──────────────┘
//! ```

use crate::error::{FramerError, Result};

/// A fixed-size packet header with a declared payload length.
pub trait WireHeader: Sized + Clone + std::fmt::Debug {
    /// Encoded header size in bytes.
    const SIZE: usize;

    /// Decode a header from the front of `buf`.
    ///
    /// Never mutates the input. Implementations must fail with
    /// [`FramerError::TooShort`] if `buf` holds fewer than [`Self::SIZE`]
    /// bytes; the extractor still treats a lenient decode on a short buffer
    /// as incomplete.
    fn decode(buf: &[u8]) -> Result<Self>;

    /// Encode this header into the first [`Self::SIZE`] bytes of `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is smaller than [`Self::SIZE`].
    fn encode_into(&self, buf: &mut [u8]);

    /// Number of payload bytes following the header.
    fn data_length(&self) -> u32;

    /// Encode this header into a fresh vector.
    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::SIZE];
        self.encode_into(&mut buf);
        buf
    }
}

/// Check that `buf` can hold a header of `size` bytes.
#[inline]
pub(crate) fn ensure_len(buf: &[u8], size: usize) -> Result<()> {
    if buf.len() < size {
        return Err(FramerError::TooShort {
            needed: size,
            available: buf.len(),
        });
    }
    Ok(())
}

/// Read a little-endian `u32` at `offset`. Caller guarantees bounds.
#[inline]
pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Bare 4-byte little-endian length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthHeader {
    /// Payload length in bytes.
    pub data_length: u32,
}

impl LengthHeader {
    /// Create a new header.
    pub fn new(data_length: u32) -> Self {
        Self { data_length }
    }
}

impl WireHeader for LengthHeader {
    const SIZE: usize = 4;

    fn decode(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, Self::SIZE)?;
        Ok(Self {
            data_length: read_u32_le(buf, 0),
        })
    }

    fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= Self::SIZE);
        buf[0..4].copy_from_slice(&self.data_length.to_le_bytes());
    }

    #[inline]
    fn data_length(&self) -> u32 {
        self.data_length
    }
}
