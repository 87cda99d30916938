//! Length-width selector
//!
//! Chooses how many bytes (1-4) carry the value length, and maps that width
//! to and from the 2-bit class stored in the header.

use bytes::{Buf, BufMut};

use crate::error::{Result, WireError};

/// Widest value-length field, in bytes
pub const MAX_LENGTH_WIDTH: usize = 4;

/// Number of bytes used to encode a value length
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LengthWidth {
    One,
    Two,
    Three,
    Four,
}

/// Width <-> stored class. Width 4 is stored as 0: the field is only 2 bits.
const CLASS_TABLE: [(LengthWidth, u16); 4] = [
    (LengthWidth::One, 1),
    (LengthWidth::Two, 2),
    (LengthWidth::Three, 3),
    (LengthWidth::Four, 0),
];

impl LengthWidth {
    /// Smallest width that can represent `len`
    pub fn for_length(len: u64) -> Result<Self> {
        match len {
            0..=0xFF => Ok(LengthWidth::One),
            0x100..=0xFFFF => Ok(LengthWidth::Two),
            0x1_0000..=0xFF_FFFF => Ok(LengthWidth::Three),
            0x100_0000..=0xFFFF_FFFF => Ok(LengthWidth::Four),
            _ => Err(WireError::LengthOutOfRange(len)),
        }
    }

    /// Width in bytes (1-4)
    pub const fn bytes(self) -> usize {
        match self {
            LengthWidth::One => 1,
            LengthWidth::Two => 2,
            LengthWidth::Three => 3,
            LengthWidth::Four => 4,
        }
    }

    /// Width for a byte count, if it is between 1 and 4
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        CLASS_TABLE
            .iter()
            .map(|&(width, _)| width)
            .find(|width| width.bytes() == bytes)
    }

    /// The 2-bit class written into the header
    pub fn class(self) -> u16 {
        CLASS_TABLE
            .iter()
            .find(|&&(width, _)| width == self)
            .map_or(0, |&(_, class)| class)
    }

    /// Width for a stored 2-bit class. Only the low 2 bits are considered.
    pub fn from_class(class: u16) -> Self {
        let class = class & 0b11;
        CLASS_TABLE
            .iter()
            .find(|&&(_, stored)| stored == class)
            .map_or(LengthWidth::Four, |&(width, _)| width)
    }
}

/// Minimum number of bytes (1-4) needed to represent `len`
///
/// Fails with `LengthOutOfRange` for lengths of 2^32 and above.
pub fn width_of(len: u64) -> Result<usize> {
    LengthWidth::for_length(len).map(LengthWidth::bytes)
}

/// Write the low `width` bytes of `len` in big-endian order
pub fn put_length<B: BufMut>(buf: &mut B, len: u32, width: LengthWidth) {
    buf.put_uint(u64::from(len), width.bytes());
}

/// Read a `width`-byte big-endian length, left-padded with zeroes
///
/// `buf` must hold at least `width.bytes()` bytes.
pub fn get_length<B: Buf>(buf: &mut B, width: LengthWidth) -> u32 {
    // At most 4 bytes are read, so the result always fits in a u32
    buf.get_uint(width.bytes()) as u32
}
