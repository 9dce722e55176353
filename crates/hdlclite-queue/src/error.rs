/// Errors that can occur while parsing an entry queue buffer.
///
/// Every variant is fatal to the parse: once a length is wrong, the offsets of
/// all following entries are meaningless.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The buffer is too short to hold the 12-byte header.
    #[error("buffer too small for queue header ({len} bytes, need {needed})")]
    TruncatedHeader { len: usize, needed: usize },

    /// The header declares more ring data than the buffer holds.
    #[error("ring buffer data smaller than encoded size ({available} bytes, header declares {declared})")]
    DataSizeMismatch { declared: usize, available: usize },

    /// `head` or `tail` points outside the ring data.
    #[error("queue offsets out of range (head {head}, tail {tail}, size {size})")]
    OffsetOutOfRange { head: u32, tail: u32, size: u32 },

    /// An entry length prefix runs past the end of the active data.
    #[error("unterminated varint at offset {offset}")]
    UnterminatedVarint { offset: usize },

    /// An entry length prefix needs more than 32 bits.
    #[error("varint exceeded bit limit at offset {offset}")]
    VarintOverflow { offset: usize },

    /// An entry claims more bytes than remain in the active data.
    #[error("encoded size too large for array (entry of {length} bytes at offset {offset}, {remaining} remaining)")]
    EntryTooLarge {
        offset: usize,
        length: usize,
        remaining: usize,
    },
}

impl QueueError {
    /// True for errors where a declared size disagrees with the bytes present.
    pub fn is_size_mismatch(&self) -> bool {
        matches!(
            self,
            QueueError::TruncatedHeader { .. }
                | QueueError::DataSizeMismatch { .. }
                | QueueError::EntryTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;
