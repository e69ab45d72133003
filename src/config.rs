//! Stream feeder configuration.
//!
//! # Example
//!
//! ```
//! use vader_framer::FramerConfig;
//!
//! let config = FramerConfig::from_json_str(r#"{ "max_data_length": 4096 }"#).unwrap();
//! assert_eq!(config.max_data_length, Some(4096));
//! assert_eq!(config.read_chunk_size, 64 * 1024);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FramerError, Result};
use crate::protocol::DEFAULT_BUFFER_CAPACITY;

/// Default ceiling on a declared payload length (16MB).
pub const DEFAULT_MAX_DATA_LENGTH: u32 = 16 * 1024 * 1024;

/// Default size of a single transport read (64KB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Largest accepted read chunk size (16MB).
pub const MAX_READ_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Largest accepted initial buffer capacity (256MB).
pub const MAX_INITIAL_CAPACITY: usize = 256 * 1024 * 1024;

/// Configuration for a [`StreamFeeder`](crate::StreamFeeder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramerConfig {
    /// Largest payload a header may declare; `None` disables the check.
    pub max_data_length: Option<u32>,
    /// Bytes requested per transport read.
    pub read_chunk_size: usize,
    /// Initial capacity of the extractor buffer.
    pub initial_capacity: usize,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            max_data_length: Some(DEFAULT_MAX_DATA_LENGTH),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            initial_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl FramerConfig {
    /// Configuration without a data length ceiling.
    pub fn unbounded() -> Self {
        Self {
            max_data_length: None,
            ..Self::default()
        }
    }

    /// Set the data length ceiling.
    pub fn with_max_data_length(mut self, max: u32) -> Self {
        self.max_data_length = Some(max);
        self
    }

    /// Set the read chunk size.
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject settings the feeder cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.read_chunk_size == 0 {
            return Err(FramerError::Config(
                "read_chunk_size must be non-zero".to_string(),
            ));
        }
        if self.read_chunk_size > MAX_READ_CHUNK_SIZE {
            return Err(FramerError::Config(format!(
                "read_chunk_size {} exceeds maximum {}",
                self.read_chunk_size, MAX_READ_CHUNK_SIZE
            )));
        }
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(FramerError::Config(format!(
                "initial_capacity {} exceeds maximum {}",
                self.initial_capacity, MAX_INITIAL_CAPACITY
            )));
        }
        Ok(())
    }
}
