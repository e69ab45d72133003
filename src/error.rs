//! Error types for vader-framer.

use thiserror::Error;

/// Main error type for all framing operations.
#[derive(Debug, Error)]
pub enum FramerError {
    /// I/O error while reading from the transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Not enough bytes to decode a header yet.
    #[error("Buffer too short: need {needed} bytes, have {available}")]
    TooShort { needed: usize, available: usize },

    /// `extract` called while no complete packet is buffered.
    #[error("No complete packet buffered")]
    Incomplete,

    /// A header declared more payload than the configured ceiling.
    #[error("Declared data length {declared} exceeds maximum {max}")]
    PayloadTooLarge { declared: u32, max: u32 },

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// Protocol-layer rejection (bad magic, oversized length).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Peer closed the connection in the middle of a packet.
    #[error("Connection closed with {buffered} bytes of a partial packet buffered")]
    ConnectionClosed { buffered: usize },
}

impl FramerError {
    /// True for the "need more data" condition.
    #[inline]
    pub fn is_too_short(&self) -> bool {
        matches!(self, FramerError::TooShort { .. })
    }
}

/// Result type alias using FramerError.
pub type Result<T> = std::result::Result<T, FramerError>;
