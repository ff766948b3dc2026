//! Bridge-level errors and the policy deciding what each one means for a
//! running loop.

use std::time::Duration;

use mcgram_rcon::RconError;
use mcgram_telegram::ChatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("console: {0}")]
    Console(#[from] RconError),

    #[error("log file: {0}")]
    LogIo(#[from] std::io::Error),

    #[error("chat: {0}")]
    Chat(#[from] ChatError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// What a loop does after an iteration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Expected while the server sleeps; move on.
    Continue,
    /// Try again on the next tick.
    Retry,
    /// Wait before the next attempt.
    Backoff(Duration),
    /// Stop the process.
    Fatal,
}

impl BridgeError {
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Console(_) => Disposition::Continue,
            Self::LogIo(_) => Disposition::Retry,
            Self::Chat(e) => match e.retry_after() {
                Some(wait) => Disposition::Backoff(wait),
                None => Disposition::Retry,
            },
            Self::Config(_) => Disposition::Fatal,
        }
    }

    /// Log the error at the level its disposition warrants and return it.
    pub fn report(&self, context: &str) -> Disposition {
        let disposition = self.disposition();
        match disposition {
            Disposition::Continue => tracing::debug!(error = %self, "{context} failed"),
            Disposition::Retry => tracing::warn!(error = %self, "{context} failed, retrying"),
            Disposition::Backoff(wait) => {
                tracing::warn!(error = %self, ?wait, "{context} failed, backing off");
            }
            Disposition::Fatal => tracing::error!(error = %self, "{context} failed"),
        }
        disposition
    }
}
