//! HDLC-lite framing for byte streams.
//!
//! Every frame on the wire is:
//! - A `0x7E` FLAG byte opening the frame
//! - The body (optional address and control bytes, payload, little-endian
//!   CRC16/CCITT or CRC-32 frame check sequence) with FLAG and `0x7D` ESCAPE
//!   bytes escaped as `0x7D, byte ^ 0x20`
//! - A `0x7E` FLAG byte closing the frame
//!
//! [`FrameDecoder`] turns an arbitrarily chunked byte stream back into
//! verified frame bodies. [`FrameReader`] and [`FrameWriter`] adapt it to
//! blocking `Read`/`Write` transports; the `async` feature adds a
//! `tokio_util::codec` implementation.

pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::HdlcCodec;
pub use checksum::{crc16_ccitt, Checksum};
pub use codec::{
    encode_frame, encode_payload, encode_with_address, escape_into, DataFrame, FrameConfig,
    ESCAPE, ESCAPE_MASK, FLAG, HEADER_SIZE,
};
pub use decoder::{AddBytes, FrameDecoder};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
