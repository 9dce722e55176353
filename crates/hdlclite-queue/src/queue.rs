use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::error::{QueueError, Result};
use crate::leb128::{self, VarintError};

/// Header: data_size_bytes (4) + head (4) + tail (4) = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// The fixed header in front of the ring data.
///
/// Layout:
/// ```text
/// ┌─────────────────┬───────────┬───────────┬──────────────────────────┐
/// │ data_size_bytes │ head      │ tail      │ ring data                │
/// │ (4B LE)         │ (4B LE)   │ (4B LE)   │ (data_size_bytes bytes)  │
/// └─────────────────┴───────────┴───────────┴──────────────────────────┘
/// ```
///
/// There is no magic number or version: a buffer from firmware with a
/// different layout parses as garbage or fails with a size error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueHeader {
    /// Capacity of the ring data in bytes.
    pub data_size_bytes: u32,
    /// Offset of the oldest entry.
    pub head: u32,
    /// Offset one past the newest entry.
    pub tail: u32,
}

impl QueueHeader {
    /// Read the header from the front of `buffer`.
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < HEADER_SIZE {
            return Err(QueueError::TruncatedHeader {
                len: buffer.len(),
                needed: HEADER_SIZE,
            });
        }
        let word = |index: usize| {
            let start = index * 4;
            u32::from_le_bytes([
                buffer[start],
                buffer[start + 1],
                buffer[start + 2],
                buffer[start + 3],
            ])
        };
        Ok(Self {
            data_size_bytes: word(0),
            head: word(1),
            tail: word(2),
        })
    }

    /// Serialize the header in its wire layout.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.data_size_bytes.to_le_bytes());
        out[4..8].copy_from_slice(&self.head.to_le_bytes());
        out[8..12].copy_from_slice(&self.tail.to_le_bytes());
        out
    }

    /// True if the active data spans the end of the ring.
    pub fn is_wrapped(&self) -> bool {
        self.tail < self.head
    }

    /// Number of active bytes between `head` and `tail`.
    pub fn active_len(&self) -> usize {
        let (size, head, tail) = (
            self.data_size_bytes as usize,
            self.head as usize,
            self.tail as usize,
        );
        if self.is_wrapped() {
            size.saturating_sub(head) + tail
        } else {
            tail - head
        }
    }

    fn check_offsets(&self) -> Result<()> {
        if self.head > self.data_size_bytes || self.tail > self.data_size_bytes {
            return Err(QueueError::OffsetOutOfRange {
                head: self.head,
                tail: self.tail,
                size: self.data_size_bytes,
            });
        }
        Ok(())
    }
}

/// A validated snapshot of an entry queue with its active data unwrapped.
#[derive(Debug, Clone)]
pub struct EntryQueue {
    header: QueueHeader,
    active: Bytes,
}

impl EntryQueue {
    /// Validate the header and reassemble the active data from `buffer`.
    ///
    /// Only the active bytes are copied.
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        let (header, region) = split_region(buffer)?;
        let active = if header.is_wrapped() {
            unwrap_ring(&header, region)
        } else {
            Bytes::copy_from_slice(&region[header.head as usize..header.tail as usize])
        };
        Ok(Self::new(header, active))
    }

    /// Like [`EntryQueue::parse`], but borrows from `buffer` when the active
    /// data does not wrap.
    pub fn from_bytes(buffer: Bytes) -> Result<Self> {
        let (header, region) = split_region(&buffer)?;
        let active = if header.is_wrapped() {
            unwrap_ring(&header, region)
        } else {
            buffer.slice(HEADER_SIZE + header.head as usize..HEADER_SIZE + header.tail as usize)
        };
        Ok(Self::new(header, active))
    }

    fn new(header: QueueHeader, active: Bytes) -> Self {
        debug!(
            size = header.data_size_bytes,
            head = header.head,
            tail = header.tail,
            wrapped = header.is_wrapped(),
            active = active.len(),
            "parsed entry queue header"
        );
        Self { header, active }
    }

    /// The parsed header.
    pub fn header(&self) -> &QueueHeader {
        &self.header
    }

    /// The active bytes, unwrapped into logical order.
    pub fn active_bytes(&self) -> &Bytes {
        &self.active
    }

    /// Iterate the entries, oldest first.
    pub fn entries(&self) -> Entries {
        Entries::new(self.active.clone())
    }
}

impl IntoIterator for EntryQueue {
    type Item = Result<Bytes>;
    type IntoIter = Entries;

    fn into_iter(self) -> Entries {
        Entries::new(self.active)
    }
}

/// Parse an entry queue buffer into its entries.
///
/// Header and size errors are returned before any entry is produced; errors in
/// the entry data come from the iterator, which stops after the first one.
pub fn parse(buffer: &[u8]) -> Result<Entries> {
    Ok(EntryQueue::parse(buffer)?.into_iter())
}

/// Iterator over the entries of an [`EntryQueue`].
#[derive(Debug, Clone)]
pub struct Entries {
    data: Bytes,
    offset: usize,
    failed: bool,
}

impl Entries {
    fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            failed: false,
        }
    }

    fn next_entry(&mut self) -> Result<Bytes> {
        let rest = &self.data[self.offset..];
        let (length, prefix_len) = leb128::decode_u32(rest).map_err(|err| match err {
            VarintError::Unterminated => QueueError::UnterminatedVarint {
                offset: self.offset,
            },
            VarintError::Overflow => QueueError::VarintOverflow {
                offset: self.offset,
            },
        })?;

        let length = length as usize;
        let start = self.offset + prefix_len;
        let remaining = self.data.len() - start;
        if length > remaining {
            return Err(QueueError::EntryTooLarge {
                offset: self.offset,
                length,
                remaining,
            });
        }

        trace!(offset = self.offset, length, "entry");
        self.offset = start + length;
        Ok(self.data.slice(start..self.offset))
    }
}

impl Iterator for Entries {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        let entry = self.next_entry();
        if let Err(err) = &entry {
            debug!(error = %err, "entry queue corrupt, stopping");
            self.failed = true;
        }
        Some(entry)
    }
}

impl std::iter::FusedIterator for Entries {}

fn split_region(buffer: &[u8]) -> Result<(QueueHeader, &[u8])> {
    let header = QueueHeader::parse(buffer)?;
    let declared = header.data_size_bytes as usize;
    let available = buffer.len() - HEADER_SIZE;
    if available < declared {
        return Err(QueueError::DataSizeMismatch {
            declared,
            available,
        });
    }
    header.check_offsets()?;
    Ok((header, &buffer[HEADER_SIZE..HEADER_SIZE + declared]))
}

fn unwrap_ring(header: &QueueHeader, region: &[u8]) -> Bytes {
    let (head, tail) = (header.head as usize, header.tail as usize);
    let mut active = BytesMut::with_capacity(header.active_len());
    active.extend_from_slice(&region[head..]);
    active.extend_from_slice(&region[..tail]);
    active.freeze()
}
