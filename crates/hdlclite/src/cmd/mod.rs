use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use hdlclite_frame::Checksum;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod queue;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a payload into a single frame.
    Encode(EncodeArgs),
    /// Decode frames from a captured stream.
    Decode(DecodeArgs),
    /// Print the entries of an entry queue dump.
    Queue(QueueArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Queue(args) => queue::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Frame check sequence selection.
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum ChecksumArg {
    /// 2-byte CRC16/CCITT.
    #[default]
    Crc16,
    /// 4-byte CRC-32.
    Crc32,
}

impl From<ChecksumArg> for Checksum {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::Crc16 => Checksum::Crc16Ccitt,
            ChecksumArg::Crc32 => Checksum::Crc32,
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Address byte. Without it the frame carries no address/control header.
    #[arg(long, short = 'a')]
    pub address: Option<u8>,
    /// Control byte (requires --address).
    #[arg(long, requires = "address", default_value = "0")]
    pub control: u8,
    /// Frame check sequence.
    #[arg(long, value_enum, default_value = "crc16")]
    pub checksum: ChecksumArg,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to read. Reads stdin when omitted.
    pub path: Option<PathBuf>,
    /// Frame check sequence.
    #[arg(long, value_enum, default_value = "crc16")]
    pub checksum: ChecksumArg,
    /// Split address and control bytes off each frame.
    #[arg(long)]
    pub data_frames: bool,
    /// Fail on the first corrupt frame instead of skipping it.
    #[arg(long)]
    pub strict: bool,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Discard frames with payloads larger than this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_frame_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct QueueArgs {
    /// Entry queue dump (12-byte header followed by ring data).
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
