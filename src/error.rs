//! Error types for kvwire
//!
//! Provides a unified error type for encoding and decoding frames.

use std::fmt;

use thiserror::Error;

/// Result type alias using WireError
pub type Result<T> = std::result::Result<T, WireError>;

/// The frame field being written or read when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Header,
    ValueLength,
    Key,
    Value,
    Checksum,
    Flush,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Header => "header",
            Phase::ValueLength => "value length",
            Phase::Key => "key",
            Phase::Value => "value",
            Phase::Checksum => "checksum",
            Phase::Flush => "flush",
        };
        f.write_str(name)
    }
}

/// Whether a stream failure happened on the encode or decode side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encode => f.write_str("encode"),
            Direction::Decode => f.write_str("decode"),
        }
    }
}

/// Unified error type for kvwire operations
#[derive(Debug, Error)]
pub enum WireError {
    // -------------------------------------------------------------------------
    // Input Size Errors (reported before any byte is written)
    // -------------------------------------------------------------------------
    #[error("could not encode record: key length {len} exceeds maximum of {max} bytes")]
    KeyTooLong { len: usize, max: usize },

    #[error("could not encode record: value length {len} exceeds maximum of {max} bytes")]
    ValueTooLong { len: u64, max: u64 },

    #[error("length {0} cannot be represented in a 4-byte length field")]
    LengthOutOfRange(u64),

    #[error("extension tag {0} does not fit in 4 bits")]
    InvalidTag(u8),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    /// Clean boundary between frames: no more records
    #[error("could not decode record: end of stream")]
    EndOfStream,

    #[error(
        "could not decode record: stream truncated in {phase} \
         (expected {expected} bytes, got {actual})"
    )]
    TruncatedStream {
        phase: Phase,
        expected: u64,
        actual: u64,
    },

    #[error(
        "could not decode record: computed checksum {computed:#010x} \
         does not match observed {observed:#010x}"
    )]
    ChecksumMismatch { computed: u32, observed: u32 },

    #[error("could not decode record: declared value length {len} exceeds limit of {max} bytes")]
    ValueLimitExceeded { len: u64, max: u64 },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("could not {direction} record: I/O error in {phase}: {source}")]
    Stream {
        direction: Direction,
        phase: Phase,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WireError {
    /// True for the clean end-of-stream signal that terminates a decode loop
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, WireError::EndOfStream)
    }

    /// True if the caller can retry with adjusted input.
    ///
    /// Everything else leaves the stream in an unknown position.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WireError::KeyTooLong { .. }
                | WireError::ValueTooLong { .. }
                | WireError::LengthOutOfRange(_)
                | WireError::InvalidTag(_)
        )
    }

    pub(crate) fn encode_io(phase: Phase, source: std::io::Error) -> Self {
        WireError::Stream {
            direction: Direction::Encode,
            phase,
            source,
        }
    }

    pub(crate) fn decode_io(phase: Phase, source: std::io::Error) -> Self {
        WireError::Stream {
            direction: Direction::Decode,
            phase,
            source,
        }
    }
}
