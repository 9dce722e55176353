//! Wire constants, escaping and frame encoding.

use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::Checksum;
use crate::error::{FrameError, Result};

/// Frame delimiter.
pub const FLAG: u8 = 0x7E;

/// Marks the following byte as escaped.
pub const ESCAPE: u8 = 0x7D;

/// XORed into an escaped byte.
pub const ESCAPE_MASK: u8 = 0x20;

/// Data-frame header: address (1) + control (1) = 2 bytes.
pub const HEADER_SIZE: usize = 2;

/// A data frame: address and control header plus user payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    /// Destination or source address.
    pub address: u8,
    /// Control field.
    pub control: u8,
    /// The user payload.
    pub payload: Bytes,
}

impl DataFrame {
    /// Create a new data frame.
    pub fn new(address: u8, control: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            control,
            payload: payload.into(),
        }
    }

    /// Split a verified frame body into header and payload.
    ///
    /// `body` is what the decoder yields: unescaped, checksum already removed.
    pub fn parse(body: Bytes) -> Result<Self> {
        if body.len() < HEADER_SIZE {
            return Err(FrameError::MissingHeader { len: body.len() });
        }
        Ok(Self {
            address: body[0],
            control: body[1],
            payload: body.slice(HEADER_SIZE..),
        })
    }

    /// Encode this frame into the wire format.
    pub fn encode(&self, checksum: Checksum, dst: &mut BytesMut) {
        encode_frame(checksum, self.address, self.control, &self.payload, dst);
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameConfig {
    /// Frame check sequence. Default: CRC16/CCITT.
    pub checksum: Checksum,
    /// Maximum payload size in bytes. Default: unbounded.
    ///
    /// Enforced by [`FrameWriter`](crate::FrameWriter) and the decoders; the
    /// encoding functions themselves never cap.
    pub max_frame_size: Option<usize>,
}

impl FrameConfig {
    /// Configuration for the given checksum with no size cap.
    pub fn with_checksum(checksum: Checksum) -> Self {
        Self {
            checksum,
            ..Self::default()
        }
    }
}

/// True if `byte` must be escaped inside a frame body.
pub fn needs_escape(byte: u8) -> bool {
    byte == FLAG || byte == ESCAPE
}

/// Append `data` to `dst`, escaping FLAG and ESCAPE bytes.
pub fn escape_into(data: &[u8], dst: &mut BytesMut) {
    dst.reserve(data.len());
    let mut start = 0;
    for (i, &byte) in data.iter().enumerate() {
        if needs_escape(byte) {
            dst.put_slice(&data[start..i]);
            dst.put_u8(ESCAPE);
            dst.put_u8(byte ^ ESCAPE_MASK);
            start = i + 1;
        }
    }
    dst.put_slice(&data[start..]);
}

/// Encode a header-less frame: the checksum covers `payload` alone.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────────────────────────────┬──────┐
/// │ FLAG │ escape(payload || checksum LE)   │ FLAG │
/// │ 0x7E │                                  │ 0x7E │
/// └──────┴──────────────────────────────────┴──────┘
/// ```
pub fn encode_payload(checksum: Checksum, payload: &[u8], dst: &mut BytesMut) {
    encode_parts(checksum, &[payload], dst);
}

/// Encode a data frame with an explicit address and control byte.
///
/// Wire format:
/// ```text
/// ┌──────┬────────────────────────────────────────────────────┬──────┐
/// │ FLAG │ escape(address || control || payload || checksum) │ FLAG │
/// └──────┴────────────────────────────────────────────────────┴──────┘
/// ```
pub fn encode_frame(
    checksum: Checksum,
    address: u8,
    control: u8,
    payload: &[u8],
    dst: &mut BytesMut,
) {
    encode_parts(checksum, &[&[address, control], payload], dst);
}

/// Encode a data frame with control byte `0`.
pub fn encode_with_address(checksum: Checksum, address: u8, payload: &[u8], dst: &mut BytesMut) {
    encode_frame(checksum, address, 0, payload, dst);
}

fn encode_parts(checksum: Checksum, parts: &[&[u8]], dst: &mut BytesMut) {
    let body_len: usize = parts.iter().map(|part| part.len()).sum();
    let (fcs, width) = checksum.to_le_bytes(checksum.compute_parts(parts));

    dst.reserve(body_len + width + 2);
    dst.put_u8(FLAG);
    for part in parts {
        escape_into(part, dst);
    }
    escape_into(&fcs[..width], dst);
    dst.put_u8(FLAG);
}
