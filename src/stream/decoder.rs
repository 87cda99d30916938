//! Decoder
//!
//! Reads frames from a byte source and rebuilds records.

use std::io::{BufReader, ErrorKind, Read};

use parking_lot::Mutex;

use crate::checksum::{digest_record, Checksum};
use crate::codec::{
    get_length, ExtensionTag, Header, CHECKSUM_SIZE, HEADER_SIZE, MAX_LENGTH_WIDTH, MAX_VALUE_LEN,
};
use crate::config::Config;
use crate::error::{Phase, Result, WireError};

use super::Record;

/// Upper bound on buffer space reserved before value bytes actually arrive
const PREALLOC_LIMIT: u64 = 64 * 1024;

/// Reads key-value records from a source
///
/// Like `Encoder`, a whole frame is read under one lock, so several threads
/// may drain the same decoder. Each record goes to exactly one caller.
pub struct Decoder<R: Read> {
    /// Source and hasher, serialized per frame
    inner: Mutex<DecoderState<R>>,

    /// Whether trailers are verified (vs. discarded)
    verifies: bool,

    /// Largest declared value length accepted
    max_value_len: u64,
}

struct DecoderState<R> {
    reader: R,
    hasher: Option<Box<dyn Checksum>>,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder. Trailers are verified iff `hasher` is provided;
    /// otherwise they are skipped unread.
    pub fn new(reader: R, hasher: Option<Box<dyn Checksum>>) -> Self {
        let verifies = hasher.is_some();
        tracing::debug!(verifies, "decoder created");

        Self {
            inner: Mutex::new(DecoderState { reader, hasher }),
            verifies,
            max_value_len: MAX_VALUE_LEN,
        }
    }

    /// Create a decoder from a config (checksum algorithm and value limit)
    pub fn with_config(reader: R, config: &Config) -> Self {
        let mut decoder = Self::new(reader, config.hasher());
        decoder.max_value_len = config.max_value_len;
        decoder
    }

    /// Create a decoder over a `BufReader` sized by the config
    pub fn buffered(reader: R, config: &Config) -> Decoder<BufReader<R>> {
        Decoder::with_config(
            BufReader::with_capacity(config.buffer_capacity, reader),
            config,
        )
    }

    /// Decode the next record as (key, value)
    ///
    /// Returns `WireError::EndOfStream` when the source is exhausted at a
    /// frame boundary.
    pub fn decode(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let (key, value, _) = self.decode_tagged()?;
        Ok((key, value))
    }

    /// Decode the next record as (key, value, tag)
    pub fn decode_tagged(&self) -> Result<(Vec<u8>, Vec<u8>, ExtensionTag)> {
        self.decode_record().map(Record::into_parts)
    }

    /// Decode the next record
    ///
    /// Steps:
    /// 1. Acquire the frame lock
    /// 2. Header (EndOfStream if the source is empty here)
    /// 3. Value length, key, value (TruncatedStream if short)
    /// 4. Trailer: skipped if absent, discarded or verified if present
    pub fn decode_record(&self) -> Result<Record> {
        let mut guard = self.inner.lock();
        let state = &mut *guard;

        let header = read_header(&mut state.reader)?;
        let width = header.width.bytes();

        let mut length = [0u8; MAX_LENGTH_WIDTH];
        read_exact_phase(&mut state.reader, &mut length[..width], Phase::ValueLength)?;
        let value_len = u64::from(get_length(&mut &length[..width], header.width));

        if value_len > self.max_value_len {
            return Err(WireError::ValueLimitExceeded {
                len: value_len,
                max: self.max_value_len,
            });
        }

        let key = read_vec(&mut state.reader, u64::from(header.key_len), Phase::Key)?;
        let value = read_vec(&mut state.reader, value_len, Phase::Value)?;

        if header.checksummed {
            let mut observed = [0u8; CHECKSUM_SIZE];
            read_exact_phase(&mut state.reader, &mut observed, Phase::Checksum)?;

            if let Some(hasher) = state.hasher.as_mut() {
                let computed = digest_record(hasher, &key, &value);
                if computed != observed {
                    let err = WireError::ChecksumMismatch {
                        computed: u32::from_be_bytes(computed),
                        observed: u32::from_be_bytes(observed),
                    };
                    tracing::warn!(key_len = key.len(), value_len, "{}", err);
                    return Err(err);
                }
            }
        }

        tracing::trace!(
            key_len = key.len(),
            value_len,
            width,
            tag = header.tag.value(),
            checksummed = header.checksummed,
            "frame decoded"
        );

        Ok(Record {
            key,
            value,
            tag: header.tag,
        })
    }

    /// Iterate over records until the end of the stream
    pub fn records(&self) -> Records<'_, R> {
        Records {
            decoder: self,
            done: false,
        }
    }

    /// Whether checksum trailers are verified by this decoder
    pub fn verifies_checksums(&self) -> bool {
        self.verifies
    }

    /// Consume the decoder and return the source
    pub fn into_inner(self) -> R {
        self.inner.into_inner().reader
    }
}

/// Iterator over decoded records
///
/// A clean end of stream ends iteration. Any other error is yielded once,
/// after which the iterator is exhausted.
pub struct Records<'a, R: Read> {
    decoder: &'a Decoder<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.decoder.decode_record() {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                self.done = true;
                if e.is_end_of_stream() {
                    None
                } else {
                    Some(Err(e))
                }
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for Records<'_, R> {}

// =============================================================================
// Read helpers
// =============================================================================

/// Read the header, distinguishing a clean end of stream from a torn header
fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut raw = [0u8; HEADER_SIZE];
    let read = fill(reader, &mut raw, Phase::Header)?;

    match read {
        0 => Err(WireError::EndOfStream),
        HEADER_SIZE => Ok(Header::from_bytes(raw)),
        partial => {
            tracing::debug!(read = partial, "stream ended inside a header");
            Err(WireError::TruncatedStream {
                phase: Phase::Header,
                expected: HEADER_SIZE as u64,
                actual: partial as u64,
            })
        }
    }
}

fn read_exact_phase<R: Read>(reader: &mut R, buf: &mut [u8], phase: Phase) -> Result<()> {
    let read = fill(reader, buf, phase)?;
    if read < buf.len() {
        tracing::debug!(%phase, read, expected = buf.len(), "stream truncated");
        return Err(WireError::TruncatedStream {
            phase,
            expected: buf.len() as u64,
            actual: read as u64,
        });
    }
    Ok(())
}

/// Read exactly `len` bytes into a new buffer without trusting `len` for
/// the up-front allocation
fn read_vec<R: Read>(reader: &mut R, len: u64, phase: Phase) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT) as usize);
    let read = reader
        .by_ref()
        .take(len)
        .read_to_end(&mut buf)
        .map_err(|e| WireError::decode_io(phase, e))?;

    if (read as u64) < len {
        tracing::debug!(%phase, read, expected = len, "stream truncated");
        return Err(WireError::TruncatedStream {
            phase,
            expected: len,
            actual: read as u64,
        });
    }
    Ok(buf)
}

/// Read until `buf` is full or the source is exhausted; returns bytes read
fn fill<R: Read>(reader: &mut R, buf: &mut [u8], phase: Phase) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(WireError::decode_io(phase, e)),
        }
    }
    Ok(filled)
}
