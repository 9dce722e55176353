use std::fmt;
use std::io;

use hdlclite_frame::FrameError;
use hdlclite_queue::QueueError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn queue_error(context: &str, err: QueueError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_errors_map_to_exit_codes() {
        let mismatch = FrameError::ChecksumMismatch {
            computed: 1,
            received: 2,
        };
        assert_eq!(frame_error("decode", mismatch).code, DATA_INVALID);
        assert_eq!(
            frame_error("decode", FrameError::ConnectionClosed).code,
            FAILURE
        );
        let denied = FrameError::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(frame_error("read", denied).code, PERMISSION_DENIED);
    }

    #[test]
    fn queue_errors_are_data_invalid() {
        let err = queue_error("parse", QueueError::VarintOverflow { offset: 0 });
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("parse: varint exceeded bit limit"));
    }
}
