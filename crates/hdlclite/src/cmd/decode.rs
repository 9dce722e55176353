use std::fs::File;
use std::io::Read;

use bytes::Bytes;
use hdlclite_frame::{DataFrame, FrameConfig, FrameError, FrameReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frame, FrameRecord, OutputFormat};

#[derive(Debug, Default, PartialEq, Eq)]
struct DecodeSummary {
    frames: usize,
    dropped: usize,
}

struct DecodedFrame {
    address: Option<u8>,
    control: Option<u8>,
    payload: Bytes,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let source: Box<dyn Read> = match &args.path {
        Some(path) => Box::new(
            File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        None => Box::new(std::io::stdin().lock()),
    };

    let summary = decode_stream(source, &args, |record| print_frame(record, format))?;
    tracing::info!(
        frames = summary.frames,
        dropped = summary.dropped,
        "decode finished"
    );
    Ok(SUCCESS)
}

fn decode_stream<R: Read>(
    source: R,
    args: &DecodeArgs,
    mut emit: impl FnMut(&FrameRecord<'_>),
) -> CliResult<DecodeSummary> {
    let config = FrameConfig {
        checksum: args.checksum.into(),
        max_frame_size: args.max_frame_size,
    };
    let mut reader = FrameReader::with_config(source, config);
    let mut summary = DecodeSummary::default();

    while args.count.is_none_or(|limit| summary.frames < limit) {
        let next = reader
            .read_frame()
            .and_then(|body| split_header(body, args.data_frames));

        match next {
            Ok(frame) => {
                emit(&FrameRecord {
                    index: summary.frames,
                    address: frame.address,
                    control: frame.control,
                    payload: &frame.payload,
                });
                summary.frames += 1;
            }
            Err(FrameError::ConnectionClosed) => {
                if !reader.decoder().is_idle() {
                    tracing::warn!(
                        buffered = reader.decoder().buffered_len(),
                        "capture ended inside a frame"
                    );
                }
                break;
            }
            Err(err) if err.is_frame_local() && !args.strict => {
                summary.dropped += 1;
                tracing::warn!(error = %err, "dropping frame");
            }
            Err(err) => return Err(frame_error("decode failed", err)),
        }
    }

    Ok(summary)
}

fn split_header(body: Bytes, data_frames: bool) -> Result<DecodedFrame, FrameError> {
    if !data_frames {
        return Ok(DecodedFrame {
            address: None,
            control: None,
            payload: body,
        });
    }
    let frame = DataFrame::parse(body)?;
    Ok(DecodedFrame {
        address: Some(frame.address),
        control: Some(frame.control),
        payload: frame.payload,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;
    use hdlclite_frame::{encode_frame, encode_payload, Checksum};

    use super::*;
    use crate::cmd::ChecksumArg;
    use crate::exit::DATA_INVALID;

    fn args() -> DecodeArgs {
        DecodeArgs {
            path: None,
            checksum: ChecksumArg::Crc16,
            data_frames: false,
            strict: false,
            count: None,
            max_frame_size: None,
        }
    }

    fn collect(wire: &[u8], args: &DecodeArgs) -> CliResult<(DecodeSummary, Vec<Vec<u8>>)> {
        let mut payloads = Vec::new();
        let summary = decode_stream(Cursor::new(wire.to_vec()), args, |record| {
            payloads.push(record.payload.to_vec())
        })?;
        Ok((summary, payloads))
    }

    fn corrupt_then_good() -> BytesMut {
        let mut wire = BytesMut::from(&b"\x7Ebroken\x00\x00\x7E"[..]);
        encode_payload(Checksum::Crc16Ccitt, b"good", &mut wire);
        wire
    }

    #[test]
    fn skips_corrupt_frames_by_default() {
        let (summary, payloads) = collect(&corrupt_then_good(), &args()).unwrap();
        assert_eq!(
            summary,
            DecodeSummary {
                frames: 1,
                dropped: 1
            }
        );
        assert_eq!(payloads, vec![b"good".to_vec()]);
    }

    #[test]
    fn oversized_frames_are_dropped() {
        let mut wire = BytesMut::new();
        encode_payload(Checksum::Crc16Ccitt, b"way too long", &mut wire);
        encode_payload(Checksum::Crc16Ccitt, b"ok", &mut wire);

        let args = DecodeArgs {
            max_frame_size: Some(4),
            ..args()
        };
        let (summary, payloads) = collect(&wire, &args).unwrap();
        assert_eq!(
            summary,
            DecodeSummary {
                frames: 1,
                dropped: 1
            }
        );
        assert_eq!(payloads, vec![b"ok".to_vec()]);
    }

    #[test]
    fn huge_max_frame_size_is_accepted() {
        let args = DecodeArgs {
            max_frame_size: Some(usize::MAX),
            ..args()
        };
        let (summary, payloads) = collect(b"\x7EA\x15\xB9\x7E", &args).unwrap();
        assert_eq!(summary.frames, 1);
        assert_eq!(payloads, vec![b"A".to_vec()]);
    }

    #[test]
    fn strict_mode_fails_on_corrupt_frame() {
        let args = DecodeArgs {
            strict: true,
            ..args()
        };
        let err = collect(&corrupt_then_good(), &args).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn count_limits_output() {
        let mut wire = BytesMut::new();
        for payload in [&b"1"[..], b"2", b"3"] {
            encode_payload(Checksum::Crc16Ccitt, payload, &mut wire);
        }
        let args = DecodeArgs {
            count: Some(2),
            ..args()
        };
        let (summary, payloads) = collect(&wire, &args).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(payloads, vec![b"1".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn data_frames_split_header() {
        let mut wire = BytesMut::new();
        encode_frame(Checksum::Crc32, b'R', 0, b"rpc", &mut wire);
        encode_payload(Checksum::Crc32, b"x", &mut wire);

        let args = DecodeArgs {
            checksum: ChecksumArg::Crc32,
            data_frames: true,
            ..args()
        };
        let mut records = Vec::new();
        let summary = decode_stream(Cursor::new(wire.to_vec()), &args, |record| {
            records.push((record.address, record.control, record.payload.to_vec()))
        })
        .unwrap();

        // The one-byte frame has no room for a header and is dropped.
        assert_eq!(summary.dropped, 1);
        assert_eq!(records, vec![(Some(b'R'), Some(0), b"rpc".to_vec())]);
    }
}
