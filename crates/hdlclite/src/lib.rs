//! HDLC-lite framing and entry queue decoding for embedded device links.
//!
//! hdlclite turns payloads into byte-stuffed, checksum-protected frames for
//! serial-style links, decodes them back from an arbitrarily chunked stream,
//! and reads the variable-length entry queues firmware leaves in memory.
//!
//! # Crate Structure
//!
//! - [`frame`]: HDLC-lite encoding, streaming decoder, blocking reader/writer
//! - [`queue`]: Variable-length entry queue decoder (behind `queue` feature)

/// Re-export frame types.
pub mod frame {
    pub use hdlclite_frame::*;
}

/// Re-export queue types (requires `queue` feature).
#[cfg(feature = "queue")]
pub mod queue {
    pub use hdlclite_queue::*;
}
