//! Integration tests for kvwire
//!
//! Round trips through in-memory and file-backed streams, concurrent use of
//! a shared encoder/decoder, and the CLI.

mod common;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Cursor;
use std::process::Command;

use common::{WATTS_KEY, WATTS_VALUE};
use kvwire::{
    Checksum, ChecksumAlgorithm, Config, Crc32, Decoder, Encoder, ExtensionTag, Fnv1a32, Record,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn hasher(algorithm: Option<ChecksumAlgorithm>) -> Option<Box<dyn Checksum>> {
    algorithm.map(ChecksumAlgorithm::hasher)
}

fn sample_records() -> Vec<Record> {
    let sizes = [0usize, 1, 255, 256, 1000, 65_535, 65_536, 70_000];
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let key = format!("key-{:03}", i).into_bytes();
            let value = (0..size).map(|b| (b % 251) as u8).collect::<Vec<u8>>();
            let tag = ExtensionTag::new((i % 16) as u8).unwrap();
            Record::new(key, value).with_tag(tag)
        })
        .chain(std::iter::once(Record::new(vec![0xAB; 511], WATTS_VALUE)))
        .chain(std::iter::once(Record::new(WATTS_KEY, Vec::new())))
        .collect()
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_round_trip_all_checksum_combinations() {
    let modes = [
        None,
        Some(ChecksumAlgorithm::Crc32),
        Some(ChecksumAlgorithm::Fnv1a),
    ];
    let records = sample_records();

    for writer_mode in modes {
        for reader_mode in [None, writer_mode] {
            let encoder = Encoder::new(Vec::new(), hasher(writer_mode));
            for record in &records {
                encoder.encode_record(record).unwrap();
            }

            let bytes = encoder.into_inner();
            let expected_len: u64 = records
                .iter()
                .map(|r| r.encoded_len(writer_mode.is_some()).unwrap())
                .sum();
            assert_eq!(bytes.len() as u64, expected_len);

            let decoder = Decoder::new(Cursor::new(bytes), hasher(reader_mode));
            let decoded: Vec<Record> = decoder.records().collect::<Result<_, _>>().unwrap();
            assert_eq!(
                decoded, records,
                "writer {:?} / reader {:?}",
                writer_mode, reader_mode
            );
        }
    }
}

#[test]
fn test_round_trip_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.kvw");
    let config = Config::builder()
        .checksum(Some(ChecksumAlgorithm::Crc32))
        .buffer_capacity(4096)
        .build();

    let records = sample_records();
    {
        let encoder = Encoder::buffered(File::create(&path).unwrap(), &config);
        for record in &records {
            encoder.encode_record(record).unwrap();
        }
        encoder.flush().unwrap();
    }

    let decoder = Decoder::buffered(File::open(&path).unwrap(), &config);
    assert!(decoder.verifies_checksums());

    let decoded: Vec<Record> = decoder.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(decoded, records);
}

#[test]
fn test_custom_checksum_injection() {
    /// Sums bytes; weak, but enough to show any 32-bit hash plugs in
    struct ByteSum(u32);

    impl Checksum for ByteSum {
        fn reset(&mut self) {
            self.0 = 0;
        }

        fn update(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = self.0.wrapping_add(u32::from(b));
            }
        }

        fn finalize(&self) -> [u8; 4] {
            self.0.to_be_bytes()
        }
    }

    let encoder = Encoder::new(Vec::new(), Some(Box::new(ByteSum(0))));
    encoder.encode(&[1, 2], &[3, 250]).unwrap();
    let bytes = encoder.into_inner();
    assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 1, 0]);

    let decoder = Decoder::new(bytes.as_slice(), Some(Box::new(ByteSum(0))));
    assert_eq!(decoder.decode().unwrap(), (vec![1, 2], vec![3, 250]));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

const THREADS: usize = 8;
const PER_THREAD: usize = 100;

fn value_for(thread: usize, i: usize) -> Vec<u8> {
    vec![thread as u8; (thread * 37 + i * 13) % 700]
}

#[test]
fn test_concurrent_encoders_do_not_interleave_frames() {
    let encoder = Encoder::new(Vec::new(), Some(Box::new(Crc32::new())));

    crossbeam::thread::scope(|s| {
        for thread in 0..THREADS {
            let encoder = &encoder;
            s.spawn(move |_| {
                for i in 0..PER_THREAD {
                    let key = format!("t{}-{}", thread, i);
                    encoder
                        .encode(key.as_bytes(), &value_for(thread, i))
                        .unwrap();
                }
            });
        }
    })
    .unwrap();

    let bytes = encoder.into_inner();
    let decoder = Decoder::new(bytes.as_slice(), Some(Box::new(Crc32::new())));

    let mut seen = BTreeMap::new();
    for record in decoder.records() {
        let record = record.unwrap();
        seen.insert(String::from_utf8(record.key).unwrap(), record.value);
    }

    assert_eq!(seen.len(), THREADS * PER_THREAD);
    for thread in 0..THREADS {
        for i in 0..PER_THREAD {
            assert_eq!(seen[&format!("t{}-{}", thread, i)], value_for(thread, i));
        }
    }
}

#[test]
fn test_concurrent_decoders_each_record_once() {
    let encoder = Encoder::new(Vec::new(), Some(Box::new(Fnv1a32::new())));
    for i in 0..(THREADS * PER_THREAD) {
        encoder
            .encode(format!("k{}", i).as_bytes(), &value_for(i % THREADS, i))
            .unwrap();
    }

    let decoder = Decoder::new(Cursor::new(encoder.into_inner()), Some(Box::new(Fnv1a32::new())));

    let batches = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let decoder = &decoder;
                s.spawn(move |_| {
                    let mut keys = Vec::new();
                    loop {
                        match decoder.decode() {
                            Ok((key, _)) => keys.push(String::from_utf8(key).unwrap()),
                            Err(e) if e.is_end_of_stream() => break keys,
                            Err(e) => panic!("decode failed: {}", e),
                        }
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    })
    .unwrap();

    let mut all: Vec<String> = batches.into_iter().flatten().collect();
    assert_eq!(all.len(), THREADS * PER_THREAD);
    all.sort();
    all.dedup();
    assert_eq!(all.len(), THREADS * PER_THREAD);
}

// =============================================================================
// CLI Tests
// =============================================================================

#[test]
fn test_cli_pack_then_unpack() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("input.tsv");
    let packed = temp_dir.path().join("packed.kvw");
    fs::write(&input, "alpha\tone\nbeta\ttwo\n\ngamma\tthree\n").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_kvwire"))
        .args(["pack", "--checksum", "crc32", "--tag", "9", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&packed)
        .status()
        .unwrap();
    assert!(status.success());

    let bytes = fs::read(&packed).unwrap();
    let decoder = Decoder::new(bytes.as_slice(), Some(Box::new(Crc32::new())));
    let (key, value, tag) = decoder.decode_tagged().unwrap();
    assert_eq!((key.as_slice(), value.as_slice()), (&b"alpha"[..], &b"one"[..]));
    assert_eq!(tag.value(), 9);

    let output = Command::new(env!("CARGO_BIN_EXE_kvwire"))
        .args(["unpack", "--checksum", "crc32", "--input"])
        .arg(&packed)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "9\talpha\tone\n9\tbeta\ttwo\n9\tgamma\tthree\n"
    );

    let output = Command::new(env!("CARGO_BIN_EXE_kvwire"))
        .args(["unpack", "--summary", "--input"])
        .arg(&packed)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "records: 3\npayload bytes: 25\n"
    );
}

#[test]
fn test_cli_unpack_detects_corruption() {
    let temp_dir = TempDir::new().unwrap();
    let packed = temp_dir.path().join("packed.kvw");

    let encoder = Encoder::new(Vec::new(), Some(Box::new(Fnv1a32::new())));
    encoder.encode(b"key", b"value").unwrap();
    let mut bytes = encoder.into_inner();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x55;
    fs::write(&packed, &bytes).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_kvwire"))
        .args(["unpack", "--checksum", "fnv1a", "--input"])
        .arg(&packed)
        .status()
        .unwrap();
    assert!(!status.success());
}
