//! Blocking frame reader over `std::io::Read`.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::debug;

use crate::codec::{DataFrame, FrameConfig};
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete, verified
/// frame bodies. Frame-local errors such as a checksum mismatch are returned
/// from [`read_frame`](Self::read_frame) once; the next call continues with the
/// following frame.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
    pending: VecDeque<Result<Bytes>>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::with_config(config),
            pending: VecDeque::new(),
        }
    }

    /// Read the next frame body (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(result) = self.pending.pop_front() {
                return result;
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if !self.decoder.is_idle() {
                    debug!(
                        buffered = self.decoder.buffered_len(),
                        "stream ended inside a frame"
                    );
                }
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend(self.decoder.add_bytes(&chunk[..read]));
        }
    }

    /// Read the next frame and split off its address and control header.
    pub fn read_data_frame(&mut self) -> Result<DataFrame> {
        DataFrame::parse(self.read_frame()?)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// The decoder state for this stream.
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        self.decoder.config()
    }
}
