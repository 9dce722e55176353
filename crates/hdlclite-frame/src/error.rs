/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A frame was delimited but its frame check sequence did not match.
    ///
    /// The decoder has already discarded the frame and keeps running.
    #[error("frame checksum mismatch (computed {computed:#x}, received {received:#x})")]
    ChecksumMismatch { computed: u32, received: u32 },

    /// A frame grew past the configured maximum before its closing FLAG.
    #[error("frame exceeded maximum size of {max} bytes and was discarded")]
    FrameTooLarge { max: usize },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A decoded frame is too short to carry an address and control byte.
    #[error("frame too short for address/control header ({len} bytes)")]
    MissingHeader { len: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for errors that only affect a single frame.
    ///
    /// The stream stays usable after these; callers typically log and drop the frame.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            FrameError::ChecksumMismatch { .. }
                | FrameError::FrameTooLarge { .. }
                | FrameError::MissingHeader { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
