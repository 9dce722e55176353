//! Frame check sequences.
//!
//! Both schemes are appended little-endian after the frame body. The width is
//! fixed per scheme and never negotiated, so encoder and decoder must agree on
//! the [`Checksum`] up front.

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// CRC16/CCITT initial value (`crc_hqx(data, 0xFFFF)`).
pub const CRC16_INITIAL: u16 = 0xFFFF;

const CRC16_POLY: u16 = 0x1021;

const CRC16_TABLE: [u16; 256] = build_crc16_table();

const fn build_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Continue a CRC16/CCITT computation over `data`.
pub fn crc16_ccitt_update(mut crc: u16, data: &[u8]) -> u16 {
    for &byte in data {
        let index = ((crc >> 8) as u8 ^ byte) as usize;
        crc = (crc << 8) ^ CRC16_TABLE[index];
    }
    crc
}

/// CRC16/CCITT with polynomial 0x1021 and initial value 0xFFFF.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    crc16_ccitt_update(CRC16_INITIAL, data)
}

/// The frame check sequence a codec instance uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Checksum {
    /// 2-byte CRC16/CCITT.
    #[default]
    Crc16Ccitt,
    /// 4-byte CRC-32 (IEEE).
    Crc32,
}

impl Checksum {
    /// Number of bytes the checksum occupies on the wire.
    pub const fn width(self) -> usize {
        match self {
            Checksum::Crc16Ccitt => 2,
            Checksum::Crc32 => 4,
        }
    }

    /// Checksum over a single contiguous buffer.
    pub fn compute(self, data: &[u8]) -> u32 {
        self.compute_parts(&[data])
    }

    /// Checksum over the concatenation of `parts`.
    pub fn compute_parts(self, parts: &[&[u8]]) -> u32 {
        match self {
            Checksum::Crc16Ccitt => {
                let crc = parts
                    .iter()
                    .fold(CRC16_INITIAL, |crc, part| crc16_ccitt_update(crc, part));
                u32::from(crc)
            }
            Checksum::Crc32 => {
                let mut hasher = crc32fast::Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                hasher.finalize()
            }
        }
    }

    /// Append `value` in its little-endian wire form.
    pub fn put(self, value: u32, dst: &mut BytesMut) {
        match self {
            Checksum::Crc16Ccitt => dst.put_u16_le(value as u16),
            Checksum::Crc32 => dst.put_u32_le(value),
        }
    }

    /// Little-endian wire bytes for `value`, truncated to [`Checksum::width`].
    pub fn to_le_bytes(self, value: u32) -> ([u8; 4], usize) {
        (value.to_le_bytes(), self.width())
    }

    /// Verify the trailing checksum of an unescaped frame body.
    ///
    /// Returns the length of the data preceding the checksum. A frame shorter
    /// than the checksum width never verifies.
    pub fn verify(self, frame: &[u8]) -> Result<usize> {
        let width = self.width();
        let split = frame.len().saturating_sub(width);
        let (data, trailer) = frame.split_at(split);

        let computed = self.compute(data);
        let received = trailer
            .iter()
            .rev()
            .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte));

        if trailer.len() != width || computed != received {
            return Err(FrameError::ChecksumMismatch { computed, received });
        }
        Ok(split)
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Checksum::Crc16Ccitt => write!(f, "crc16-ccitt"),
            Checksum::Crc32 => write!(f, "crc32"),
        }
    }
}
