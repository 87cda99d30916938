//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::io::{self, Read, Write};

pub const WATTS_KEY: &[u8] = b"Alan Watts [1915-1973]";

pub const WATTS_VALUE: &[u8] = b"We are living in a culture entirely hypnotized by the \
illusion of time, in which the so-called present moment is \
felt as nothing but an infintesimal hairline between an \
all-powerfully causative past and an absorbingly important \
future. We have no present. Our consciousness is almost \
completely preoccupied with memory and expectation. We do not \
realize that there never was, is, nor will be any other \
experience than present experience. We are therefore out of \
touch with reality. We confuse the world as talked about, \
described, and measured with the world which actually is. We \
are sick with a fascination for the useful tools of names and \
numbers, of symbols, signs, conceptions and ideas.";

/// FNV-1a digest of WATTS_KEY followed by WATTS_VALUE
pub const WATTS_FNV1A: [u8; 4] = [0xdb, 0x1a, 0x20, 0x3e];

/// CRC-32 digest of WATTS_KEY followed by WATTS_VALUE
pub const WATTS_CRC32: [u8; 4] = [0x24, 0xce, 0x99, 0xa5];

/// Sink that accepts `limit` bytes and then fails
pub struct FailingWriter {
    pub written: Vec<u8>,
    pub limit: usize,
}

impl FailingWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            written: Vec::new(),
            limit,
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.written.len();
        if room == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        let n = room.min(buf.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source that always fails
pub struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"))
    }
}

/// Sink that counts flushes
#[derive(Debug, Default)]
pub struct FlushCounter {
    pub bytes: Vec<u8>,
    pub flushes: usize,
}

impl Write for FlushCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
