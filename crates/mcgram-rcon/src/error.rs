//! Error types for the console client.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RconError {
    #[error("failed to connect to console at {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("console rejected the password")]
    AuthFailed,

    #[error("console did not answer within {0:?}")]
    Timeout(Duration),

    #[error("command is {len} bytes, console accepts at most {max}")]
    CommandTooLong { len: usize, max: usize },

    #[error("malformed console packet: {0}")]
    Protocol(String),

    #[error("console io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RconError {
    /// Classify an IO error raised mid-session.
    pub(crate) fn from_io(err: std::io::Error, timeout: Duration) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Self::Timeout(timeout),
            ErrorKind::InvalidData => Self::Protocol(err.to_string()),
            _ => Self::Io(err),
        }
    }
}
