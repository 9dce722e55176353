//! Streaming decoder state machine.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::checksum::Checksum;
use crate::codec::{FrameConfig, ESCAPE, ESCAPE_MASK, FLAG};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Incremental HDLC-lite decoder.
///
/// Bytes are pushed in arbitrary chunks; every closing FLAG yields either the
/// verified frame body (checksum stripped) or a frame-local error. State
/// persists across calls, so a frame may be split over any number of chunks.
///
/// An `ESCAPE` applies to the very next raw byte whatever its value. In
/// particular `ESCAPE FLAG` decodes to the data byte `0x5E` rather than ending
/// the frame. Real HDLC aborts the frame there; this decoder keeps the literal
/// behavior for wire compatibility with existing peers.
///
/// A decoder belongs to one stream. It is not synchronized: share it between
/// threads only behind a lock.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: BytesMut,
    escape_pending: bool,
    overflowed: bool,
    config: FrameConfig,
}

impl FrameDecoder {
    /// Create a decoder with default configuration (CRC16, no size cap).
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a decoder for the given checksum.
    pub fn with_checksum(checksum: Checksum) -> Self {
        Self::with_config(FrameConfig::with_checksum(checksum))
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            escape_pending: false,
            overflowed: false,
            config,
        }
    }

    /// Feed a chunk of raw bytes and lazily decode the frames it completes.
    ///
    /// Bytes are consumed as the returned iterator advances. Dropping it early
    /// leaves the rest of the chunk unprocessed; see [`AddBytes::remaining`].
    pub fn add_bytes<'d, 'c>(&'d mut self, chunk: &'c [u8]) -> AddBytes<'d, 'c> {
        AddBytes {
            decoder: self,
            bytes: chunk.iter(),
        }
    }

    /// Feed a single raw byte.
    ///
    /// Returns `Some` when the byte closes a non-empty frame.
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<Bytes>> {
        if self.escape_pending {
            self.escape_pending = false;
            self.append(byte ^ ESCAPE_MASK);
            return None;
        }

        match byte {
            ESCAPE => {
                self.escape_pending = true;
                None
            }
            FLAG => self.finish_frame(),
            _ => {
                self.append(byte);
                None
            }
        }
    }

    /// Discard any partially assembled frame.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.escape_pending = false;
        self.overflowed = false;
    }

    /// True if no partial frame is buffered.
    pub fn is_idle(&self) -> bool {
        self.buf.is_empty() && !self.escape_pending && !self.overflowed
    }

    /// Number of unescaped bytes buffered for the current frame.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// True if the last byte seen was an unconsumed ESCAPE.
    pub fn escape_pending(&self) -> bool {
        self.escape_pending
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn max_buffered(&self) -> Option<usize> {
        self.config
            .max_frame_size
            .map(|max| {
                max.saturating_add(crate::codec::HEADER_SIZE)
                    .saturating_add(self.config.checksum.width())
            })
    }

    fn append(&mut self, byte: u8) {
        if self.overflowed {
            return;
        }
        if let Some(limit) = self.max_buffered() {
            if self.buf.len() >= limit {
                debug!(limit, "frame exceeded maximum size, discarding until next FLAG");
                self.buf.clear();
                self.overflowed = true;
                return;
            }
        }
        self.buf.extend_from_slice(&[byte]);
    }

    fn finish_frame(&mut self) -> Option<Result<Bytes>> {
        if self.overflowed {
            self.overflowed = false;
            self.buf.clear();
            let max = self.config.max_frame_size.unwrap_or_default();
            return Some(Err(FrameError::FrameTooLarge { max }));
        }
        if self.buf.is_empty() {
            return None;
        }

        let frame = self.buf.split().freeze();
        trace!(len = frame.len(), "frame delimited");

        match self.config.checksum.verify(&frame) {
            Ok(data_len) => Some(Ok(frame.slice(..data_len))),
            Err(err) => {
                debug!(len = frame.len(), error = %err, "dropping corrupt frame");
                Some(Err(err))
            }
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames decoded from one chunk, produced by [`FrameDecoder::add_bytes`].
pub struct AddBytes<'d, 'c> {
    decoder: &'d mut FrameDecoder,
    bytes: std::slice::Iter<'c, u8>,
}

impl<'c> AddBytes<'_, 'c> {
    /// The part of the chunk not yet consumed.
    pub fn remaining(&self) -> &'c [u8] {
        self.bytes.as_slice()
    }
}

impl Iterator for AddBytes<'_, '_> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        for &byte in self.bytes.by_ref() {
            if let Some(result) = self.decoder.push_byte(byte) {
                return Some(result);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_frame, encode_payload};

    fn wire(checksum: Checksum, payloads: &[&[u8]]) -> BytesMut {
        let mut buf = BytesMut::new();
        for payload in payloads {
            encode_payload(checksum, payload, &mut buf);
        }
        buf
    }

    fn ok_frames(results: Vec<Result<Bytes>>) -> Vec<Bytes> {
        results.into_iter().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn decodes_single_frame() {
        let mut decoder = FrameDecoder::new();
        let frames: Vec<_> = decoder.add_bytes(b"\x7EA\x15\xB9\x7E").collect();
        assert_eq!(ok_frames(frames), vec![Bytes::from_static(b"A")]);
        assert!(decoder.is_idle());
    }

    #[test]
    fn decodes_empty_payload_frame() {
        let mut decoder = FrameDecoder::new();
        let frames: Vec<_> = decoder.add_bytes(b"\x7E\xFF\xFF\x7E").collect();
        assert_eq!(ok_frames(frames), vec![Bytes::new()]);
    }

    #[test]
    fn back_to_back_flags_are_ignored() {
        let mut decoder = FrameDecoder::new();
        let mut stream = BytesMut::from(&[FLAG, FLAG, FLAG][..]);
        stream.extend_from_slice(&wire(Checksum::Crc16Ccitt, &[b"x"]));
        stream.extend_from_slice(&[FLAG, FLAG]);

        let frames: Vec<_> = decoder.add_bytes(&stream).collect();
        assert_eq!(ok_frames(frames), vec![Bytes::from_static(b"x")]);
    }

    #[test]
    fn shared_flag_between_frames() {
        let mut stream = wire(Checksum::Crc32, &[b"one"]);
        let second = wire(Checksum::Crc32, &[b"two"]);
        // Drop the second frame's opening FLAG; the first frame's closing FLAG opens it.
        stream.extend_from_slice(&second[1..]);

        let mut decoder = FrameDecoder::with_checksum(Checksum::Crc32);
        let frames: Vec<_> = decoder.add_bytes(&stream).collect();
        assert_eq!(
            ok_frames(frames),
            vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")]
        );
    }

    #[test]
    fn streaming_equivalence_for_every_split() {
        let payload = b"\x7Dsplit\x7Eme\x7D\x7E";
        for checksum in [Checksum::Crc16Ccitt, Checksum::Crc32] {
            let stream = wire(checksum, &[payload, b"", b"tail"]);
            let mut whole = FrameDecoder::with_checksum(checksum);
            let expected = ok_frames(whole.add_bytes(&stream).collect());

            for split in 0..=stream.len() {
                let mut decoder = FrameDecoder::with_checksum(checksum);
                let (left, right) = stream.split_at(split);
                let mut got: Vec<_> = decoder.add_bytes(left).collect();
                got.extend(decoder.add_bytes(right));
                assert_eq!(ok_frames(got), expected, "{checksum}: split at {split}");
            }
        }
    }

    #[test]
    fn byte_at_a_time_matches_bulk() {
        let stream = wire(Checksum::Crc16Ccitt, &[b"a", b"\x7E\x7E", b"ccc"]);
        let mut decoder = FrameDecoder::new();
        let got: Vec<_> = stream
            .iter()
            .filter_map(|&byte| decoder.push_byte(byte))
            .collect();
        assert_eq!(
            ok_frames(got),
            vec![
                Bytes::from_static(b"a"),
                Bytes::from_static(b"\x7E\x7E"),
                Bytes::from_static(b"ccc"),
            ]
        );
    }

    #[test]
    fn escape_pending_carries_across_chunks() {
        let stream = wire(Checksum::Crc16Ccitt, &[&[ESCAPE]]);
        let escape_at = stream.iter().skip(1).position(|&b| b == ESCAPE).unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.add_bytes(&stream[..=escape_at]).count(), 0);
        assert!(decoder.escape_pending());

        let frames: Vec<_> = decoder.add_bytes(&stream[escape_at + 1..]).collect();
        assert_eq!(ok_frames(frames), vec![Bytes::from_static(&[ESCAPE])]);
    }

    #[test]
    fn escaped_flag_is_data_not_delimiter() {
        let mut decoder = FrameDecoder::new();
        let results: Vec<_> = decoder.add_bytes(&[FLAG, b'a', ESCAPE, FLAG]).collect();
        assert!(results.is_empty());
        assert_eq!(decoder.buffered_len(), 2);
        assert!(!decoder.escape_pending());
    }

    #[test]
    fn checksum_mismatch_is_recoverable() {
        let mut stream = BytesMut::from(&b"\x7Ebad\x00\x00\x7E"[..]);
        stream.extend_from_slice(&wire(Checksum::Crc16Ccitt, &[b"good"]));

        let mut decoder = FrameDecoder::new();
        let results: Vec<_> = decoder.add_bytes(&stream).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(FrameError::ChecksumMismatch { .. })));
        assert_eq!(results[1].as_ref().unwrap().as_ref(), b"good");
        assert!(decoder.is_idle());
    }

    #[test]
    fn wrong_checksum_variant_is_rejected() {
        let stream = wire(Checksum::Crc32, &[b"crc32 frame"]);
        let mut decoder = FrameDecoder::with_checksum(Checksum::Crc16Ccitt);
        let results: Vec<_> = decoder.add_bytes(&stream).collect();
        assert!(matches!(results[..], [Err(FrameError::ChecksumMismatch { .. })]));
    }

    #[test]
    fn short_frame_is_a_checksum_mismatch() {
        let mut decoder = FrameDecoder::new();
        let results: Vec<_> = decoder.add_bytes(&[FLAG, 0x01, FLAG]).collect();
        assert!(matches!(results[..], [Err(FrameError::ChecksumMismatch { .. })]));
    }

    #[test]
    fn oversized_frame_is_discarded() {
        let cfg = FrameConfig {
            max_frame_size: Some(4),
            ..FrameConfig::default()
        };
        let mut stream = BytesMut::new();
        encode_frame(Checksum::Crc16Ccitt, 1, 0, b"way too long", &mut stream);
        encode_frame(Checksum::Crc16Ccitt, 1, 0, b"ok", &mut stream);

        let mut decoder = FrameDecoder::with_config(cfg);
        let results: Vec<_> = decoder.add_bytes(&stream).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(FrameError::FrameTooLarge { max: 4 })));
        assert_eq!(results[1].as_ref().unwrap().as_ref(), b"\x01\x00ok");
    }

    #[test]
    fn frame_at_size_limit_is_accepted() {
        let cfg = FrameConfig {
            max_frame_size: Some(4),
            ..FrameConfig::default()
        };
        let mut stream = BytesMut::new();
        encode_frame(Checksum::Crc16Ccitt, 1, 0, b"four", &mut stream);

        let mut decoder = FrameDecoder::with_config(cfg);
        let results: Vec<_> = decoder.add_bytes(&stream).collect();
        assert_eq!(results[0].as_ref().unwrap().as_ref(), b"\x01\x00four");
    }

    #[test]
    fn huge_size_limit_does_not_overflow() {
        let cfg = FrameConfig {
            max_frame_size: Some(usize::MAX),
            ..FrameConfig::default()
        };
        let mut decoder = FrameDecoder::with_config(cfg);
        let frames: Vec<_> = decoder.add_bytes(b"\x7EA\x15\xB9\x7E").collect();
        assert_eq!(ok_frames(frames), vec![Bytes::from_static(b"A")]);
    }

    #[test]
    fn dropped_iterator_reports_remaining_bytes() {
        let stream = wire(Checksum::Crc16Ccitt, &[b"first", b"second"]);
        let mut decoder = FrameDecoder::new();
        let mut iter = decoder.add_bytes(&stream);
        assert_eq!(iter.next().unwrap().unwrap().as_ref(), b"first");
        let rest = iter.remaining();
        assert!(!rest.is_empty());

        let frames: Vec<_> = decoder.add_bytes(rest).collect();
        assert_eq!(ok_frames(frames), vec![Bytes::from_static(b"second")]);
    }

    #[test]
    fn reset_discards_partial_frame() {
        let stream = wire(Checksum::Crc16Ccitt, &[b"partial"]);
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.add_bytes(&stream[..5]).count(), 0);
        assert!(!decoder.is_idle());

        decoder.reset();
        assert!(decoder.is_idle());
        assert_eq!(decoder.buffered_len(), 0);
    }
}
