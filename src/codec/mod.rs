//! Codec Module
//!
//! Pure bit-layout logic shared by the encoder and decoder.
//!
//! ## Frame Format
//! ```text
//! ┌────────────┬──────────────┬─────────────┬─────────┬────────────────┐
//! │ Header (2) │ ValLen (1-4) │ Key (0-511) │  Value  │ Checksum (0/4) │
//! └────────────┴──────────────┴─────────────┴─────────┴────────────────┘
//! ```
//!
//! All multi-byte integers are big-endian. The value length is written with
//! the fewest bytes that can hold it, and the header records that width.
//! Per-record overhead is 3 to 10 bytes.

mod header;
mod tag;
mod width;

pub use header::{Header, HEADER_SIZE, MAX_KEY_LEN};
pub use tag::ExtensionTag;
pub use width::{get_length, put_length, width_of, LengthWidth, MAX_LENGTH_WIDTH};

use crate::error::{Result, WireError};

/// Largest encodable value length: the widest length field holds 4 bytes
pub const MAX_VALUE_LEN: u64 = u32::MAX as u64;

/// Size of the optional checksum trailer in bytes
pub const CHECKSUM_SIZE: usize = 4;

/// Validate key and value lengths against the frame limits
///
/// Returns the width the value length will be written with, so callers
/// compute it exactly once per record.
pub fn check_lengths(key_len: usize, value_len: u64) -> Result<LengthWidth> {
    if key_len > MAX_KEY_LEN {
        return Err(WireError::KeyTooLong {
            len: key_len,
            max: MAX_KEY_LEN,
        });
    }

    if value_len > MAX_VALUE_LEN {
        return Err(WireError::ValueTooLong {
            len: value_len,
            max: MAX_VALUE_LEN,
        });
    }

    LengthWidth::for_length(value_len)
}
