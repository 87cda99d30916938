//! Checksum protocol
//!
//! Whether a trailer exists on the wire is the encoder's choice; whether the
//! decoder verifies it is the decoder's own choice. Both sides hash the key
//! bytes followed by the value bytes and exchange the 32-bit digest in
//! big-endian order.

use std::fmt;
use std::str::FromStr;

use crate::codec::CHECKSUM_SIZE;
use crate::error::WireError;

/// An injectable 32-bit hash accumulator
///
/// The encoder and decoder own one each and reset it after every record.
pub trait Checksum: Send {
    /// Return to the initial state
    fn reset(&mut self);

    /// Feed bytes into the accumulator
    fn update(&mut self, bytes: &[u8]);

    /// Big-endian digest of everything fed since the last reset
    fn finalize(&self) -> [u8; CHECKSUM_SIZE];
}

impl<C: Checksum + ?Sized> Checksum for Box<C> {
    fn reset(&mut self) {
        (**self).reset();
    }

    fn update(&mut self, bytes: &[u8]) {
        (**self).update(bytes);
    }

    fn finalize(&self) -> [u8; CHECKSUM_SIZE] {
        (**self).finalize()
    }
}

/// CRC-32 (IEEE) backed by crc32fast
#[derive(Clone, Default)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Crc32 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crc32").finish_non_exhaustive()
    }
}

impl Checksum for Crc32 {
    fn reset(&mut self) {
        self.hasher.reset();
    }

    fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn finalize(&self) -> [u8; CHECKSUM_SIZE] {
        self.hasher.clone().finalize().to_be_bytes()
    }
}

/// 32-bit FNV-1a
#[derive(Debug, Clone)]
pub struct Fnv1a32 {
    state: u32,
}

impl Fnv1a32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1a32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Checksum for Fnv1a32 {
    fn reset(&mut self) {
        self.state = Self::OFFSET_BASIS;
    }

    fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u32::from(byte);
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }

    fn finalize(&self) -> [u8; CHECKSUM_SIZE] {
        self.state.to_be_bytes()
    }
}

/// Built-in checksum algorithms selectable through configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Crc32,
    Fnv1a,
}

impl ChecksumAlgorithm {
    /// Fresh accumulator for this algorithm
    pub fn hasher(self) -> Box<dyn Checksum> {
        match self {
            ChecksumAlgorithm::Crc32 => Box::new(Crc32::new()),
            ChecksumAlgorithm::Fnv1a => Box::new(Fnv1a32::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Crc32 => "crc32",
            ChecksumAlgorithm::Fnv1a => "fnv1a",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crc32" => Ok(ChecksumAlgorithm::Crc32),
            "fnv1a" | "fnv-1a" => Ok(ChecksumAlgorithm::Fnv1a),
            other => Err(WireError::Config(format!(
                "unknown checksum algorithm: {}",
                other
            ))),
        }
    }
}

/// Digest of `key` followed by `value`, leaving the accumulator reset
pub(crate) fn digest_record<C: Checksum + ?Sized>(
    hasher: &mut C,
    key: &[u8],
    value: &[u8],
) -> [u8; CHECKSUM_SIZE] {
    hasher.update(key);
    hasher.update(value);
    let digest = hasher.finalize();
    hasher.reset();
    digest
}
