//! # vader-framer
//!
//! Length-prefixed packet framer for streaming binary IM protocols.
//!
//! Turns a byte stream into discrete `(header, payload)` packets. The
//! header layout is pluggable through [`protocol::WireHeader`]; two layouts
//! ship with the crate:
//!
//! - [`protocol::LengthHeader`]: a bare 4-byte little-endian length
//! - [`protocol::MrimHeader`]: the 44-byte Mail.Ru agent (MRIM) header
//!
//! ## Architecture
//!
//! - **Header decoding**: non-destructive peek of a fixed-size prefix
//! - **Packet extraction**: owns the byte buffer, yields complete packets
//! - **Stream feeding**: async read loop with a payload-size ceiling
//!
//! ## Example
//!
//! ```ignore
//! use vader_framer::{StreamFeeder, dispatch::{CommandRegistry, Flow}};
//! use vader_framer::protocol::{MrimHeader, mrim::command};
//!
//! #[tokio::main]
//! async fn main() -> vader_framer::Result<()> {
//!     let stream = tokio::net::TcpStream::connect("mrim.mail.ru:2042").await?;
//!     let (reader, _writer) = stream.into_split();
//!
//!     let mut registry = CommandRegistry::new();
//!     registry.register(command::PING, |_| Ok(Flow::Continue));
//!     registry.register(command::LOGOUT, |_| Ok(Flow::Stop));
//!
//!     StreamFeeder::<_, MrimHeader>::new(reader).run(&mut registry).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;

mod feeder;

pub use config::FramerConfig;
pub use error::{FramerError, Result};
pub use feeder::StreamFeeder;
