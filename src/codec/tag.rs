//! Extension tag
//!
//! A 4-bit value carried in every header. The codec attaches no meaning to it.

use std::fmt;

use crate::error::WireError;

/// Caller-defined 4-bit metadata attached to a record (0 through 15)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtensionTag(u8);

impl ExtensionTag {
    /// Tag used by the untagged encode/decode forms
    pub const NONE: ExtensionTag = ExtensionTag(0);

    /// Largest representable tag
    pub const MAX: ExtensionTag = ExtensionTag(0x0F);

    /// Create a tag, returning None if `value` needs more than 4 bits
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX.0 {
            Some(ExtensionTag(value))
        } else {
            None
        }
    }

    /// Build a tag from the low 4 bits of `bits`, ignoring the rest
    pub(crate) const fn from_low_bits(bits: u16) -> Self {
        ExtensionTag((bits & Self::MAX.0 as u16) as u8)
    }

    /// The raw tag value
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ExtensionTag {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ExtensionTag::new(value).ok_or(WireError::InvalidTag(value))
    }
}

impl From<ExtensionTag> for u8 {
    fn from(tag: ExtensionTag) -> u8 {
        tag.0
    }
}

impl fmt::Display for ExtensionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}
