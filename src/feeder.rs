//! Stream feeder: drives a [`PacketExtractor`] from an async byte stream.
//!
//! Reads chunks from any `AsyncRead`, appends them to the extractor and
//! yields every complete packet. The configured data length ceiling is
//! enforced here, not in the extractor, so a hostile peer cannot make the
//! buffer grow without bound.
//!
//! # Example
//!
//! ```ignore
//! use vader_framer::{FramerConfig, StreamFeeder};
//! use vader_framer::protocol::MrimHeader;
//!
//! let stream = tokio::net::TcpStream::connect("mrim.mail.ru:2042").await?;
//! let (reader, _writer) = stream.into_split();
//! let mut feeder = StreamFeeder::<_, MrimHeader>::new(reader);
//!
//! while let Some(packet) = feeder.next_packet().await? {
//!     println!("command {:#06x}, {} bytes", packet.header.msg, packet.payload.len());
//! }
//! ```

use std::collections::VecDeque;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::FramerConfig;
use crate::dispatch::{Dispatch, Flow};
use crate::error::{FramerError, Result};
use crate::protocol::{Packet, PacketExtractor, WireHeader};

/// Reads packets of header type `H` from transport `R`.
pub struct StreamFeeder<R, H> {
    reader: R,
    extractor: PacketExtractor<H>,
    config: FramerConfig,
    /// Scratch buffer for a single transport read.
    read_buf: Vec<u8>,
    /// Packets extracted but not yet handed out.
    ready: VecDeque<Packet<H>>,
}

impl<R, H> StreamFeeder<R, H>
where
    R: AsyncRead + Unpin,
    H: WireHeader,
{
    /// Create a feeder with the default configuration.
    pub fn new(reader: R) -> Self {
        Self::build(reader, FramerConfig::default())
    }

    /// Create a feeder with a custom configuration.
    pub fn with_config(reader: R, config: FramerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(reader, config))
    }

    fn build(reader: R, config: FramerConfig) -> Self {
        Self {
            reader,
            extractor: PacketExtractor::with_capacity(config.initial_capacity),
            read_buf: vec![0u8; config.read_chunk_size],
            ready: VecDeque::new(),
            config,
        }
    }

    /// Append received bytes and extract all complete packets.
    ///
    /// Packets already queued by [`next_packet`](Self::next_packet) come
    /// first, so stream order is kept when both calls are mixed.
    ///
    /// # Errors
    ///
    /// Returns [`FramerError::PayloadTooLarge`] if the header at the front
    /// of the buffer declares more than the configured ceiling. Packets
    /// completed before that header are returned first; the error surfaces
    /// on the next call. The feeder stays failed until [`reset`](Self::reset).
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Packet<H>>> {
        self.extractor.append(data);

        let mut packets: Vec<_> = self.ready.drain(..).collect();
        match self.extract_ready() {
            Ok(fresh) => packets.extend(fresh),
            Err(e) if packets.is_empty() => return Err(e),
            Err(_) => {}
        }
        Ok(packets)
    }

    /// Get the next packet, reading from the transport as needed.
    ///
    /// Returns `Ok(None)` on a clean end of stream.
    ///
    /// # Errors
    ///
    /// - [`FramerError::ConnectionClosed`] if the stream ends mid-packet
    /// - [`FramerError::PayloadTooLarge`] if the ceiling is exceeded
    /// - [`FramerError::Io`] on transport failure
    pub async fn next_packet(&mut self) -> Result<Option<Packet<H>>> {
        loop {
            if let Some(packet) = self.ready.pop_front() {
                return Ok(Some(packet));
            }

            let packets = self.extract_ready()?;
            if !packets.is_empty() {
                self.ready.extend(packets);
                continue;
            }

            let n = self.reader.read(&mut self.read_buf).await?;
            if n == 0 {
                if self.extractor.is_empty() {
                    tracing::debug!("Stream closed");
                    return Ok(None);
                }
                let buffered = self.extractor.len();
                tracing::debug!("Stream closed with {} bytes buffered", buffered);
                return Err(FramerError::ConnectionClosed { buffered });
            }

            tracing::trace!("Read {} bytes", n);
            self.extractor.append(&self.read_buf[..n]);
        }
    }

    /// Hand every packet to `dispatcher` until end of stream or [`Flow::Stop`].
    ///
    /// Dispatcher errors are logged and do not stop the loop. Returns the
    /// number of packets dispatched.
    pub async fn run<D>(&mut self, dispatcher: &mut D) -> Result<u64>
    where
        D: Dispatch<H>,
    {
        let mut dispatched = 0u64;

        while let Some(packet) = self.next_packet().await? {
            dispatched += 1;
            match dispatcher.dispatch(packet) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => {
                    tracing::debug!("Dispatcher stopped the stream after {} packets", dispatched);
                    break;
                }
                Err(e) => {
                    tracing::error!("Dispatch error: {}", e);
                }
            }
        }

        Ok(dispatched)
    }

    /// Drop all buffered bytes and queued packets (connection reset or
    /// re-handshake).
    pub fn reset(&mut self) {
        self.extractor.clear();
        self.ready.clear();
    }

    /// The underlying extractor.
    pub fn extractor(&self) -> &PacketExtractor<H> {
        &self.extractor
    }

    /// The active configuration.
    pub fn config(&self) -> &FramerConfig {
        &self.config
    }

    /// Give back the transport, discarding any buffered data.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Extract complete packets, stopping at an oversized header.
    fn extract_ready(&mut self) -> Result<Vec<Packet<H>>> {
        let mut packets = Vec::new();

        loop {
            if let Err(e) = self.check_ceiling() {
                if packets.is_empty() {
                    return Err(e);
                }
                break;
            }
            match self.extractor.try_extract() {
                Some(packet) => packets.push(packet),
                None => break,
            }
        }

        Ok(packets)
    }

    fn check_ceiling(&self) -> Result<()> {
        let (Some(max), Some(declared)) = (
            self.config.max_data_length,
            self.extractor.pending_data_length(),
        ) else {
            return Ok(());
        };

        if declared > max {
            tracing::warn!("Peer declared {} bytes, ceiling is {}", declared, max);
            return Err(FramerError::PayloadTooLarge { declared, max });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::CommandRegistry;
    use crate::protocol::mrim::{command, MrimHeader};
    use crate::protocol::{build_packet, LengthHeader};
    use tokio::io::AsyncWriteExt;

    fn make_packet_bytes(payload: &[u8]) -> Vec<u8> {
        build_packet(&LengthHeader::new(payload.len() as u32), payload)
    }

    fn mrim_bytes(msg: u32, seq: u32, payload: &[u8]) -> Vec<u8> {
        build_packet(&MrimHeader::new(msg, seq, payload.len() as u32), payload)
    }

    #[test]
    fn test_feed_multiple_packets() {
        let mut feeder = StreamFeeder::<_, LengthHeader>::new(tokio::io::empty());

        let mut data = make_packet_bytes(b"one");
        data.extend_from_slice(&make_packet_bytes(b"two"));
        data.extend_from_slice(&[0x03, 0]);

        let packets = feeder.feed(&data).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].payload(), b"one");
        assert_eq!(packets[1].payload(), b"two");
        assert_eq!(feeder.extractor().len(), 2);

        let packets = feeder.feed(&[0, 0, b'x', b'y', b'z']).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].payload(), b"xyz");
    }

    #[test]
    fn test_feed_rejects_oversized_header() {
        let config = FramerConfig::default().with_max_data_length(8);
        let mut feeder =
            StreamFeeder::<_, LengthHeader>::with_config(tokio::io::empty(), config).unwrap();

        let err = feeder.feed(&[0x09, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            FramerError::PayloadTooLarge {
                declared: 9,
                max: 8
            }
        ));

        // Stays failed until reset
        assert!(feeder.feed(&[]).is_err());
        feeder.reset();
        assert_eq!(feeder.feed(&make_packet_bytes(b"ok")).unwrap().len(), 1);
    }

    #[test]
    fn test_feed_returns_packets_before_oversized_header() {
        let config = FramerConfig::default().with_max_data_length(8);
        let mut feeder =
            StreamFeeder::<_, LengthHeader>::with_config(tokio::io::empty(), config).unwrap();

        let mut data = make_packet_bytes(b"good");
        data.extend_from_slice(&[0xFF, 0xFF, 0, 0]);

        let packets = feeder.feed(&data).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].payload(), b"good");

        assert!(matches!(
            feeder.feed(&[]),
            Err(FramerError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_unbounded_config_waits() {
        let mut feeder = StreamFeeder::<_, LengthHeader>::with_config(
            tokio::io::empty(),
            FramerConfig::unbounded(),
        )
        .unwrap();

        assert!(feeder.feed(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap().is_empty());
        assert_eq!(feeder.extractor().len(), 4);
    }

    #[tokio::test]
    async fn test_feed_after_next_packet_keeps_order() {
        let mut data = make_packet_bytes(b"p1");
        data.extend(make_packet_bytes(b"p2"));
        data.extend(make_packet_bytes(b"p3"));
        let mut feeder = StreamFeeder::<_, LengthHeader>::new(&data[..]);

        let mut order = Vec::new();
        let first = feeder.next_packet().await.unwrap().unwrap();
        order.push(first.payload.clone());

        for packet in feeder.feed(&make_packet_bytes(b"p4")).unwrap() {
            order.push(packet.payload.clone());
        }
        while let Some(packet) = feeder.next_packet().await.unwrap() {
            order.push(packet.payload.clone());
        }

        let order: Vec<&[u8]> = order.iter().map(|b| &b[..]).collect();
        assert_eq!(order, vec![&b"p1"[..], &b"p2"[..], &b"p3"[..], &b"p4"[..]]);
    }

    #[tokio::test]
    async fn test_feed_keeps_queued_packets_before_oversized_header() {
        let mut data = make_packet_bytes(b"a");
        data.extend(make_packet_bytes(b"b"));
        let config = FramerConfig::default().with_max_data_length(8);
        let mut feeder = StreamFeeder::<_, LengthHeader>::with_config(&data[..], config).unwrap();

        assert_eq!(feeder.next_packet().await.unwrap().unwrap().payload(), b"a");

        let packets = feeder.feed(&[0xFF, 0, 0, 0]).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].payload(), b"b");
        assert!(matches!(
            feeder.feed(&[]),
            Err(FramerError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_huge_chunk_size_rejected_before_allocation() {
        let config = FramerConfig::default().with_read_chunk_size(usize::MAX);
        let err = StreamFeeder::<_, LengthHeader>::with_config(tokio::io::empty(), config)
            .err()
            .unwrap();
        assert!(matches!(err, FramerError::Config(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FramerConfig::default().with_read_chunk_size(0);
        assert!(StreamFeeder::<_, LengthHeader>::with_config(tokio::io::empty(), config).is_err());
    }

    #[tokio::test]
    async fn test_next_packet_from_slice() {
        let mut data = make_packet_bytes(&[0xAA, 0xBB]);
        data.extend_from_slice(&make_packet_bytes(b""));
        let mut feeder = StreamFeeder::<_, LengthHeader>::new(&data[..]);

        let first = feeder.next_packet().await.unwrap().unwrap();
        assert_eq!(first.payload(), &[0xAA, 0xBB]);

        let second = feeder.next_packet().await.unwrap().unwrap();
        assert!(second.payload().is_empty());

        assert!(feeder.next_packet().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_packet_small_reads() {
        let data = mrim_bytes(command::MESSAGE, 4, b"fragmented payload");
        let config = FramerConfig::default().with_read_chunk_size(3);
        let mut feeder = StreamFeeder::<_, MrimHeader>::with_config(&data[..], config).unwrap();

        let packet = feeder.next_packet().await.unwrap().unwrap();
        assert_eq!(packet.header.msg, command::MESSAGE);
        assert_eq!(packet.header.seq, 4);
        assert_eq!(packet.payload(), b"fragmented payload");
        assert!(feeder.next_packet().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eof_mid_packet() {
        let data = make_packet_bytes(b"truncated");
        let mut feeder = StreamFeeder::<_, LengthHeader>::new(&data[..7]);

        let err = feeder.next_packet().await.unwrap_err();
        assert!(matches!(err, FramerError::ConnectionClosed { buffered: 7 }));
    }

    #[tokio::test]
    async fn test_next_packet_over_duplex() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut feeder = StreamFeeder::<_, LengthHeader>::new(server);

        let writer = tokio::spawn(async move {
            client.write_all(&[0x02, 0, 0, 0]).await.unwrap();
            client.write_all(&[0xAA]).await.unwrap();
            client.write_all(&[0xBB]).await.unwrap();
            client.shutdown().await.unwrap();
        });

        let packet = feeder.next_packet().await.unwrap().unwrap();
        assert_eq!(packet.header.data_length, 2);
        assert_eq!(packet.payload(), &[0xAA, 0xBB]);
        assert!(feeder.next_packet().await.unwrap().is_none());

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_with_registry_until_stop() {
        let mut data = mrim_bytes(command::HELLO_ACK, 1, &[0x1E, 0, 0, 0]);
        data.extend(mrim_bytes(command::PING, 2, b""));
        data.extend(mrim_bytes(command::LOGOUT, 3, b""));
        data.extend(mrim_bytes(command::PING, 4, b""));

        let mut registry = CommandRegistry::new();
        registry.register(command::HELLO_ACK, |p| {
            assert_eq!(p.payload(), &[0x1E, 0, 0, 0]);
            Ok(Flow::Continue)
        });
        registry.register(command::LOGOUT, |_| Ok(Flow::Stop));

        let mut feeder = StreamFeeder::<_, MrimHeader>::new(&data[..]);
        let dispatched = feeder.run(&mut registry).await.unwrap();

        assert_eq!(dispatched, 3);
        assert_eq!(registry.handled(), 2);
        assert_eq!(registry.unhandled(), 1);

        // The packet after LOGOUT is still available
        let next = feeder.next_packet().await.unwrap().unwrap();
        assert_eq!(next.header.seq, 4);
    }

    #[tokio::test]
    async fn test_run_continues_after_dispatch_error() {
        let mut data = make_packet_bytes(b"bad");
        data.extend(make_packet_bytes(b"good"));

        let mut seen = Vec::new();
        let mut sink = |p: Packet<LengthHeader>| -> Result<Flow> {
            if p.payload() == b"bad" {
                return Err(FramerError::Protocol("rejected".to_string()));
            }
            seen.push(p.payload.clone());
            Ok(Flow::Continue)
        };

        let mut feeder = StreamFeeder::<_, LengthHeader>::new(&data[..]);
        let dispatched = feeder.run(&mut sink).await.unwrap();

        assert_eq!(dispatched, 2);
        assert_eq!(seen.len(), 1);
        assert_eq!(&seen[0][..], b"good");
    }

    #[tokio::test]
    async fn test_run_fails_on_oversized_header() {
        let data = [0x00, 0x00, 0x00, 0x10];
        let config = FramerConfig::default().with_max_data_length(1024);
        let mut feeder = StreamFeeder::<_, LengthHeader>::with_config(&data[..], config).unwrap();

        let mut sink = |_p: Packet<LengthHeader>| -> Result<Flow> { Ok(Flow::Continue) };
        let err = feeder.run(&mut sink).await.unwrap_err();
        assert!(matches!(err, FramerError::PayloadTooLarge { .. }));
    }
}
