//! Header codec
//!
//! Packs and unpacks the 16-bit header word (big-endian on the wire):
//!
//! ```text
//!  1           0
//!  5 4 3 2 1 0 9 8 7 6 5 4 3 2 1 0
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | W |C|  Tag  |     Key length  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! - W: width class of the value-length field (1, 2, 3; 0 means 4)
//! - C: a 4-byte checksum trailer follows the value
//! - Tag: 4-bit extension tag
//! - Key length: 9 bits, 0-511

use super::tag::ExtensionTag;
use super::width::LengthWidth;

/// Header size in bytes
pub const HEADER_SIZE: usize = 2;

/// Largest key the 9-bit field can describe
pub const MAX_KEY_LEN: usize = 511;

const WIDTH_SHIFT: u16 = 14;
const CHECKSUM_SHIFT: u16 = 13;
const TAG_SHIFT: u16 = 9;
const KEY_LEN_MASK: u16 = 0x01FF;

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Width of the value-length field
    pub width: LengthWidth,
    /// Whether a checksum trailer follows the value
    pub checksummed: bool,
    /// Caller-defined extension tag
    pub tag: ExtensionTag,
    /// Key length in bytes (0-511)
    pub key_len: u16,
}

impl Header {
    pub fn new(width: LengthWidth, checksummed: bool, tag: ExtensionTag, key_len: u16) -> Self {
        debug_assert!(key_len as usize <= MAX_KEY_LEN);
        Self {
            width,
            checksummed,
            tag,
            key_len,
        }
    }

    /// Pack into the 16-bit header word
    ///
    /// Key lengths above 511 are truncated to 9 bits; the encoder validates
    /// before packing.
    pub fn pack(&self) -> u16 {
        let width = self.width.class() << WIDTH_SHIFT;
        let checksum = u16::from(self.checksummed) << CHECKSUM_SHIFT;
        let tag = u16::from(self.tag.value()) << TAG_SHIFT;
        let key_len = self.key_len & KEY_LEN_MASK;

        width | checksum | tag | key_len
    }

    /// Unpack a 16-bit header word. Every word is a valid header.
    pub fn unpack(word: u16) -> Self {
        Self {
            width: LengthWidth::from_class(word >> WIDTH_SHIFT),
            checksummed: (word >> CHECKSUM_SHIFT) & 1 == 1,
            tag: ExtensionTag::from_low_bits(word >> TAG_SHIFT),
            key_len: word & KEY_LEN_MASK,
        }
    }

    /// Wire representation (big-endian)
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        self.pack().to_be_bytes()
    }

    pub fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Self {
        Self::unpack(u16::from_be_bytes(bytes))
    }
}
