//! kvwire CLI
//!
//! Packs tab-separated key/value lines into a frame stream and unpacks
//! frame streams back into lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kvwire::{ChecksumAlgorithm, Config, Decoder, Encoder, ExtensionTag, WireError};
use tracing_subscriber::{fmt, EnvFilter};

/// kvwire CLI
#[derive(Parser, Debug)]
#[command(name = "kvwire")]
#[command(about = "Encode and decode key-value record streams")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode `key<TAB>value` lines into frames
    Pack {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append a checksum trailer to every frame
        #[arg(short, long)]
        checksum: Option<ChecksumArg>,

        /// Extension tag for every record (0-15)
        #[arg(short, long, default_value = "0")]
        tag: u8,
    },

    /// Decode frames into `tag<TAB>key<TAB>value` lines
    Unpack {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Verify checksum trailers with this algorithm
        #[arg(short, long)]
        checksum: Option<ChecksumArg>,

        /// Print only record and byte counts
        #[arg(short, long)]
        summary: bool,

        /// Reject values longer than this many bytes
        #[arg(short, long)]
        max_value_len: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChecksumArg {
    Crc32,
    Fnv1a,
}

impl From<ChecksumArg> for ChecksumAlgorithm {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::Crc32 => ChecksumAlgorithm::Crc32,
            ChecksumArg::Fnv1a => ChecksumAlgorithm::Fnv1a,
        }
    }
}

fn main() {
    // Initialize tracing/logging (stderr keeps stdout clean for frames)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kvwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let outcome = match args.command {
        Commands::Pack {
            input,
            output,
            checksum,
            tag,
        } => pack(input, output, checksum.map(Into::into), tag),
        Commands::Unpack {
            input,
            checksum,
            summary,
            max_value_len,
        } => unpack(input, checksum.map(Into::into), summary, max_value_len),
    };

    if let Err(e) = outcome {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn open_input(input: Option<PathBuf>) -> kvwire::Result<Box<dyn Read>> {
    Ok(match input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin()),
    })
}

fn pack(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    checksum: Option<ChecksumAlgorithm>,
    tag: u8,
) -> kvwire::Result<()> {
    let tag = ExtensionTag::try_from(tag)?;
    let config = Config::builder().checksum(checksum).build();

    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    let encoder = Encoder::buffered(sink, &config);

    let reader = BufReader::new(open_input(input)?);
    let mut count = 0u64;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once('\t').ok_or_else(|| {
            WireError::Config(format!("line {}: expected key<TAB>value", index + 1))
        })?;

        encoder.encode_tagged(key.as_bytes(), value.as_bytes(), tag)?;
        count += 1;
    }

    encoder.flush()?;
    tracing::info!("Packed {} records (checksum: {:?})", count, checksum);

    Ok(())
}

fn unpack(
    input: Option<PathBuf>,
    checksum: Option<ChecksumAlgorithm>,
    summary: bool,
    max_value_len: Option<u64>,
) -> kvwire::Result<()> {
    let mut builder = Config::builder().checksum(checksum);
    if let Some(limit) = max_value_len {
        builder = builder.max_value_len(limit);
    }
    let config = builder.build();

    let decoder = Decoder::buffered(open_input(input)?, &config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut count = 0u64;
    let mut payload_bytes = 0u64;

    for record in decoder.records() {
        let record = record?;
        count += 1;
        payload_bytes += (record.key.len() + record.value.len()) as u64;

        if !summary {
            writeln!(
                out,
                "{}\t{}\t{}",
                record.tag,
                String::from_utf8_lossy(&record.key),
                String::from_utf8_lossy(&record.value)
            )?;
        }
    }

    if summary {
        writeln!(out, "records: {}", count)?;
        writeln!(out, "payload bytes: {}", payload_bytes)?;
    }
    out.flush()?;

    tracing::debug!("Unpacked {} records", count);
    Ok(())
}
