//! # kvwire
//!
//! A compact wire codec for streaming key-value records, as stored by an
//! embedded ordered key-value engine (keys up to 511 bytes, values up to
//! 4 GiB), with:
//! - A bit-packed 2-byte header
//! - A 1-4 byte value length sized to the value
//! - An optional 32-bit checksum trailer per record
//! - Encoders and decoders that are safe to share between threads
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐                         ┌──────────────────┐
//! │     Encoder      │       byte stream       │     Decoder      │
//! │  (Mutex<Write>)  │ ──────────────────────▶ │  (Mutex<Read>)   │
//! └────────┬─────────┘                         └────────┬─────────┘
//!          │                                            │
//!          └──────────────┬─────────────────────────────┘
//!                         │
//!          ┌──────────────┴──────────────┐
//!          ▼                             ▼
//!   ┌─────────────┐               ┌─────────────┐
//!   │    Codec    │               │  Checksum   │
//!   │ (Header,    │               │ (CRC-32,    │
//!   │  Width)     │               │  FNV-1a)    │
//!   └─────────────┘               └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use kvwire::{Crc32, Decoder, Encoder};
//!
//! let encoder = Encoder::new(Vec::new(), Some(Box::new(Crc32::new())));
//! encoder.encode(b"key", b"value").unwrap();
//!
//! let bytes = encoder.into_inner();
//! let decoder = Decoder::new(bytes.as_slice(), Some(Box::new(Crc32::new())));
//! assert_eq!(decoder.decode().unwrap(), (b"key".to_vec(), b"value".to_vec()));
//! assert!(decoder.decode().unwrap_err().is_end_of_stream());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod checksum;
pub mod codec;
pub mod stream;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use checksum::{Checksum, ChecksumAlgorithm, Crc32, Fnv1a32};
pub use codec::{ExtensionTag, MAX_KEY_LEN, MAX_VALUE_LEN};
pub use config::{Config, FlushPolicy};
pub use error::{Result, WireError};
pub use stream::{Decoder, Encoder, Record};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
