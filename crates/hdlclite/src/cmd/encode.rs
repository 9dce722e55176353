use std::fs;

use bytes::BytesMut;
use hdlclite_frame::{encode_frame, encode_payload, Checksum};

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let checksum = Checksum::from(args.checksum);
    let wire = encode(checksum, args.address, args.control, &payload);

    tracing::debug!(
        %checksum,
        payload_size = payload.len(),
        frame_size = wire.len(),
        "encoded frame"
    );
    print_encoded(&checksum.to_string(), &wire, format);
    Ok(SUCCESS)
}

fn encode(checksum: Checksum, address: Option<u8>, control: u8, payload: &[u8]) -> BytesMut {
    let mut wire = BytesMut::new();
    match address {
        Some(address) => encode_frame(checksum, address, control, payload, &mut wire),
        None => encode_payload(checksum, payload, &mut wire),
    }
    wire
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_without_address_is_header_less() {
        let wire = encode(Checksum::Crc16Ccitt, None, 0, b"A");
        assert_eq!(wire.as_ref(), b"\x7EA\x15\xB9\x7E");
    }

    #[test]
    fn encode_with_address_adds_header() {
        let wire = encode(Checksum::Crc16Ccitt, Some(b'R'), 3, b"hi");
        assert_eq!(&wire[..3], b"\x7ER\x03");
    }

    #[test]
    fn missing_payload_encodes_empty_frame() {
        let args = EncodeArgs {
            data: None,
            file: None,
            address: None,
            control: 0,
            checksum: crate::cmd::ChecksumArg::Crc16,
        };
        assert!(resolve_payload(&args).unwrap().is_empty());
    }

    #[test]
    fn unreadable_file_is_reported() {
        let args = EncodeArgs {
            data: None,
            file: Some("/nonexistent/hdlclite/payload.bin".into()),
            address: None,
            control: 0,
            checksum: crate::cmd::ChecksumArg::Crc32,
        };
        let err = resolve_payload(&args).unwrap_err();
        assert_eq!(err.code, crate::exit::FAILURE);
    }
}
