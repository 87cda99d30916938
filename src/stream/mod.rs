//! Stream Module
//!
//! Matched encoder/decoder pair that moves records across a byte stream.
//!
//! ## Responsibilities
//! - Validate record sizes before writing anything
//! - Write and read whole frames under one lock (frames never interleave)
//! - Optional 32-bit checksum trailer per record
//! - Distinguish a clean end of stream from a truncated frame
//!
//! ## Checksum Asymmetry
//! ```text
//!   encoder hasher │ decoder hasher │ result
//!  ────────────────┼────────────────┼──────────────────────────────
//!        none      │   any          │ no trailer on the wire
//!        some      │   none         │ trailer read and discarded
//!        some      │   some         │ trailer verified
//! ```

mod decoder;
mod encoder;
mod record;

pub use decoder::{Decoder, Records};
pub use encoder::Encoder;
pub use record::Record;
