//! Unsigned LEB128 varints limited to 32 bits.

use bytes::BufMut;

/// Longest encoding of a `u32`.
pub const MAX_U32_LEN: usize = 5;

/// Why a varint failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VarintError {
    /// The input ended while the continuation bit was still set.
    #[error("unterminated varint")]
    Unterminated,
    /// The value needs more than 32 bits.
    #[error("varint exceeded bit limit")]
    Overflow,
}

/// Decode a ULEB128 value from the front of `buf`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_u32(buf: &[u8]) -> Result<(u32, usize), VarintError> {
    let mut value = 0u32;
    for (i, &byte) in buf.iter().enumerate() {
        let shift = 7 * i as u32;
        // Fifth byte: only the low 4 bits fit, and nothing may follow.
        if shift == 28 && byte & 0xF0 != 0 {
            return Err(VarintError::Overflow);
        }
        value |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(VarintError::Unterminated)
}

/// Append the ULEB128 encoding of `value` to `dst`, returning its length.
pub fn encode_u32(mut value: u32, dst: &mut impl BufMut) -> usize {
    let mut written = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        written += 1;
        if value == 0 {
            dst.put_u8(byte);
            return written;
        }
        dst.put_u8(byte | 0x80);
    }
}

/// Number of bytes [`encode_u32`] writes for `value`.
pub fn encoded_len(value: u32) -> usize {
    let bits = 32 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}
