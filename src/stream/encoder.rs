//! Encoder
//!
//! Writes records to a byte sink as frames.

use std::io::{BufWriter, Write};

use parking_lot::Mutex;

use crate::checksum::{digest_record, Checksum};
use crate::codec::{check_lengths, put_length, ExtensionTag, Header, MAX_LENGTH_WIDTH};
use crate::config::{Config, FlushPolicy};
use crate::error::{Phase, Result, WireError};

use super::Record;

/// Writes key-value records to a sink
///
/// A frame is written under a single lock, so an `Encoder` can be shared
/// between threads without frames interleaving. A frame is never partially
/// written because of bad input: lengths are validated first. A failing sink
/// can still leave a truncated frame behind.
pub struct Encoder<W: Write> {
    /// Sink and hasher, serialized per frame
    inner: Mutex<EncoderState<W>>,

    /// Whether frames carry a checksum trailer
    checksummed: bool,

    flush_policy: FlushPolicy,
}

struct EncoderState<W> {
    writer: W,
    hasher: Option<Box<dyn Checksum>>,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder. Every frame gets a checksum trailer iff `hasher`
    /// is provided.
    pub fn new(writer: W, hasher: Option<Box<dyn Checksum>>) -> Self {
        let checksummed = hasher.is_some();
        tracing::debug!(checksummed, "encoder created");

        Self {
            inner: Mutex::new(EncoderState { writer, hasher }),
            checksummed,
            flush_policy: FlushPolicy::Manual,
        }
    }

    /// Create an encoder from a config (checksum algorithm and flush policy)
    pub fn with_config(writer: W, config: &Config) -> Self {
        let mut encoder = Self::new(writer, config.hasher());
        encoder.flush_policy = config.flush_policy;
        encoder
    }

    /// Create an encoder over a `BufWriter` sized by the config
    pub fn buffered(writer: W, config: &Config) -> Encoder<BufWriter<W>> {
        Encoder::with_config(
            BufWriter::with_capacity(config.buffer_capacity, writer),
            config,
        )
    }

    /// Encode an untagged record
    pub fn encode(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.encode_tagged(key, value, ExtensionTag::NONE)
    }

    /// Encode a record with an extension tag
    ///
    /// Steps:
    /// 1. Validate lengths (nothing is written on failure)
    /// 2. Acquire the frame lock
    /// 3. Header, value length, key, value
    /// 4. Checksum trailer if this encoder has a hasher
    pub fn encode_tagged(&self, key: &[u8], value: &[u8], tag: ExtensionTag) -> Result<()> {
        let width = check_lengths(key.len(), value.len() as u64)?;
        // check_lengths bounds both lengths, so the casts below are lossless
        let header = Header::new(width, self.checksummed, tag, key.len() as u16);

        let mut guard = self.inner.lock();
        let state = &mut *guard;

        write_phase(&mut state.writer, &header.to_bytes(), Phase::Header)?;

        let mut length = [0u8; MAX_LENGTH_WIDTH];
        put_length(&mut &mut length[..], value.len() as u32, width);
        write_phase(&mut state.writer, &length[..width.bytes()], Phase::ValueLength)?;

        write_phase(&mut state.writer, key, Phase::Key)?;
        write_phase(&mut state.writer, value, Phase::Value)?;

        if let Some(hasher) = state.hasher.as_mut() {
            let digest = digest_record(hasher, key, value);
            write_phase(&mut state.writer, &digest, Phase::Checksum)?;
        }

        if self.flush_policy == FlushPolicy::EveryRecord {
            state
                .writer
                .flush()
                .map_err(|e| WireError::encode_io(Phase::Flush, e))?;
        }

        tracing::trace!(
            key_len = key.len(),
            value_len = value.len(),
            width = width.bytes(),
            tag = tag.value(),
            "frame encoded"
        );

        Ok(())
    }

    /// Encode a `Record`, including its tag
    pub fn encode_record(&self, record: &Record) -> Result<()> {
        self.encode_tagged(&record.key, &record.value, record.tag)
    }

    /// Flush the underlying sink
    pub fn flush(&self) -> Result<()> {
        self.inner
            .lock()
            .writer
            .flush()
            .map_err(|e| WireError::encode_io(Phase::Flush, e))
    }

    /// Whether frames written by this encoder carry a checksum trailer
    pub fn is_checksummed(&self) -> bool {
        self.checksummed
    }

    /// Consume the encoder and return the sink (not flushed)
    pub fn into_inner(self) -> W {
        self.inner.into_inner().writer
    }
}

fn write_phase<W: Write>(writer: &mut W, bytes: &[u8], phase: Phase) -> Result<()> {
    writer
        .write_all(bytes)
        .map_err(|e| WireError::encode_io(phase, e))
}
