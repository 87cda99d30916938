//! Configuration for kvwire
//!
//! Centralized configuration with sensible defaults.

use crate::checksum::{Checksum, ChecksumAlgorithm};
use crate::codec::MAX_VALUE_LEN;

/// Shared configuration for encoders and decoders
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Checksum Configuration
    // -------------------------------------------------------------------------
    /// Encoder: append a trailer computed with this algorithm.
    /// Decoder: verify trailers with this algorithm (None discards them).
    pub checksum: Option<ChecksumAlgorithm>,

    // -------------------------------------------------------------------------
    // Encoder Configuration
    // -------------------------------------------------------------------------
    /// When the encoder flushes its sink
    pub flush_policy: FlushPolicy,

    // -------------------------------------------------------------------------
    // Decoder Configuration
    // -------------------------------------------------------------------------
    /// Largest value length the decoder accepts from a header (in bytes)
    pub max_value_len: u64,

    // -------------------------------------------------------------------------
    // Buffering
    // -------------------------------------------------------------------------
    /// Capacity of the BufWriter/BufReader used by `buffered` constructors
    pub buffer_capacity: usize,
}

/// Encoder flush strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Flush only when the caller asks
    #[default]
    Manual,

    /// Flush after every complete frame
    EveryRecord,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checksum: None,
            flush_policy: FlushPolicy::Manual,
            max_value_len: MAX_VALUE_LEN,
            buffer_capacity: 64 * 1024, // 64 KB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Fresh accumulator for the configured algorithm, if any
    pub fn hasher(&self) -> Option<Box<dyn Checksum>> {
        self.checksum.map(ChecksumAlgorithm::hasher)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the checksum algorithm (None disables trailers / verification)
    pub fn checksum(mut self, algorithm: Option<ChecksumAlgorithm>) -> Self {
        self.config.checksum = algorithm;
        self
    }

    /// Set the encoder flush policy
    pub fn flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.config.flush_policy = policy;
        self
    }

    /// Set the largest value length the decoder accepts (capped at the
    /// largest encodable length)
    pub fn max_value_len(mut self, len: u64) -> Self {
        self.config.max_value_len = len.min(MAX_VALUE_LEN);
        self
    }

    /// Set the buffer capacity (in bytes)
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
