//! `tokio_util::codec` adapter over [`FrameDecoder`].

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::codec::{encode_payload, DataFrame, FrameConfig};
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};

/// HDLC-lite codec for `FramedRead`/`FramedWrite`.
///
/// Decoded items are themselves results: a checksum mismatch only drops one
/// frame, so it is yielded as `Some(Err(..))` instead of terminating the stream.
/// The outer error is reserved for I/O failures.
#[derive(Debug, Default)]
pub struct HdlcCodec {
    decoder: FrameDecoder,
}

impl HdlcCodec {
    /// Create a codec with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            decoder: FrameDecoder::with_config(config),
        }
    }

    /// Current codec configuration.
    pub fn config(&self) -> &FrameConfig {
        self.decoder.config()
    }

    fn check_size(&self, size: usize) -> Result<()> {
        match self.config().max_frame_size {
            Some(max) if size > max => Err(FrameError::PayloadTooLarge { size, max }),
            _ => Ok(()),
        }
    }
}

impl Decoder for HdlcCodec {
    type Item = Result<Bytes>;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let mut consumed = src.len();
        let mut decoded = None;

        for (i, &byte) in src.iter().enumerate() {
            if let Some(result) = self.decoder.push_byte(byte) {
                consumed = i + 1;
                decoded = Some(result);
                break;
            }
        }

        src.advance(consumed);
        Ok(decoded)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let decoded = self.decode(src)?;
        if decoded.is_none() && !self.decoder.is_idle() {
            debug!(
                buffered = self.decoder.buffered_len(),
                "stream ended inside a frame"
            );
            self.decoder.reset();
        }
        Ok(decoded)
    }
}

impl Encoder<Bytes> for HdlcCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<()> {
        self.check_size(payload.len())?;
        encode_payload(self.config().checksum, &payload, dst);
        Ok(())
    }
}

impl Encoder<DataFrame> for HdlcCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: DataFrame, dst: &mut BytesMut) -> Result<()> {
        self.check_size(frame.payload.len())?;
        frame.encode(self.config().checksum, dst);
        Ok(())
    }
}
