//! Decoder for variable-length entry queues.
//!
//! Firmware keeps a ring buffer of variable-length entries; this crate reads a
//! captured copy of it (for example from a memory dump) and yields the entries
//! oldest first. The buffer is:
//! - A 12-byte header of three little-endian `u32`s: ring size, head, tail
//! - The ring data, where each entry is a ULEB128 length followed by that many
//!   bytes
//!
//! Parsing never mutates or retains the input, so one snapshot can be parsed
//! from several threads at once.

pub mod error;
pub mod leb128;
pub mod queue;

pub use error::{QueueError, Result};
pub use queue::{parse, Entries, EntryQueue, QueueHeader, HEADER_SIZE};
