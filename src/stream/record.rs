//! Record definitions
//!
//! The unit exchanged between an encoder and a decoder.

use crate::codec::{check_lengths, ExtensionTag, CHECKSUM_SIZE, HEADER_SIZE};
use crate::error::Result;

/// A key-value record with its extension tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// Uninterpreted key (at most 511 bytes)
    pub key: Vec<u8>,

    /// Uninterpreted value
    pub value: Vec<u8>,

    /// Caller-defined extension tag
    pub tag: ExtensionTag,
}

impl Record {
    /// Create an untagged record
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            tag: ExtensionTag::NONE,
        }
    }

    /// Replace the extension tag
    pub fn with_tag(mut self, tag: ExtensionTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>, ExtensionTag) {
        (self.key, self.value, self.tag)
    }

    /// Size of this record's frame on the wire
    ///
    /// Fails if the record cannot be encoded.
    pub fn encoded_len(&self, checksummed: bool) -> Result<u64> {
        let width = check_lengths(self.key.len(), self.value.len() as u64)?;
        let trailer = if checksummed { CHECKSUM_SIZE } else { 0 };

        Ok((HEADER_SIZE + width.bytes() + self.key.len() + trailer) as u64
            + self.value.len() as u64)
    }
}

impl From<(Vec<u8>, Vec<u8>)> for Record {
    fn from((key, value): (Vec<u8>, Vec<u8>)) -> Self {
        Record::new(key, value)
    }
}
