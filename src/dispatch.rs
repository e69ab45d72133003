//! Packet dispatch seam.
//!
//! The feeder hands every extracted packet to a [`Dispatch`] implementation.
//! Any `FnMut(Packet<H>) -> Result<Flow>` closure works; for MRIM streams
//! [`CommandRegistry`] routes packets by command code.
//!
//! # Example
//!
//! ```
//! use vader_framer::dispatch::{CommandRegistry, Flow};
//! use vader_framer::protocol::mrim::command;
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(command::PING, |_packet| Ok(Flow::Continue));
//! registry.register(command::LOGOUT, |_packet| Ok(Flow::Stop));
//!
//! assert!(registry.handles(command::PING));
//! ```

use std::collections::HashMap;

use crate::error::Result;
use crate::protocol::{MrimHeader, Packet};

/// What the stream loop should do after a packet is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading packets.
    Continue,
    /// Stop the loop and return to the caller.
    Stop,
}

/// Consumer of extracted packets.
pub trait Dispatch<H> {
    /// Handle one packet.
    fn dispatch(&mut self, packet: Packet<H>) -> Result<Flow>;
}

impl<H, F> Dispatch<H> for F
where
    F: FnMut(Packet<H>) -> Result<Flow>,
{
    fn dispatch(&mut self, packet: Packet<H>) -> Result<Flow> {
        self(packet)
    }
}

/// Boxed command handler.
pub type CommandHandler = Box<dyn FnMut(Packet<MrimHeader>) -> Result<Flow> + Send>;

/// Registry mapping MRIM command codes to handlers.
#[derive(Default)]
pub struct CommandRegistry {
    /// Handlers by command code.
    handlers: HashMap<u32, CommandHandler>,
    /// Handler for commands without a dedicated entry.
    fallback: Option<CommandHandler>,
    /// Packets routed to a registered handler or the fallback.
    handled: u64,
    /// Packets skipped for lack of any handler.
    unhandled: u64,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a command code, replacing any previous one.
    pub fn register<F>(&mut self, msg: u32, handler: F) -> &mut Self
    where
        F: FnMut(Packet<MrimHeader>) -> Result<Flow> + Send + 'static,
    {
        if self.handlers.insert(msg, Box::new(handler)).is_some() {
            tracing::debug!("Replaced handler for command {:#06x}", msg);
        }
        self
    }

    /// Set the handler for unregistered commands.
    pub fn fallback<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(Packet<MrimHeader>) -> Result<Flow> + Send + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Check whether a dedicated handler exists for `msg`.
    pub fn handles(&self, msg: u32) -> bool {
        self.handlers.contains_key(&msg)
    }

    /// Number of packets routed to a handler.
    pub fn handled(&self) -> u64 {
        self.handled
    }

    /// Number of packets dropped for lack of a handler.
    pub fn unhandled(&self) -> u64 {
        self.unhandled
    }
}

impl Dispatch<MrimHeader> for CommandRegistry {
    fn dispatch(&mut self, packet: Packet<MrimHeader>) -> Result<Flow> {
        let msg = packet.header.msg;

        let handler = match self.handlers.get_mut(&msg) {
            Some(h) => h,
            None => match self.fallback.as_mut() {
                Some(h) => h,
                None => {
                    tracing::warn!(
                        "No handler for command {:#06x} ({}), seq {}",
                        msg,
                        packet.header.command_name().unwrap_or("unknown"),
                        packet.header.seq
                    );
                    self.unhandled += 1;
                    return Ok(Flow::Continue);
                }
            },
        };

        self.handled += 1;
        handler(packet)
    }
}
