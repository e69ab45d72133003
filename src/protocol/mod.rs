//! Protocol module - header layouts, packets, and extraction.
//!
//! This module implements the framing layer:
//! - Fixed-size header decoding ([`LengthHeader`], [`MrimHeader`])
//! - Packet extractor for accumulating partial reads
//! - Packet struct pairing a header with its payload

mod extractor;
mod header;
pub mod mrim;
mod packet;

pub use extractor::{PacketExtractor, DEFAULT_BUFFER_CAPACITY};
pub use header::{LengthHeader, WireHeader};
pub use mrim::{MrimHeader, CS_MAGIC, MRIM_HEADER_SIZE, PROTO_VERSION};
pub use packet::{build_packet, Packet};
