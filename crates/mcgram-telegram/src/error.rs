//! Error types for the chat surface.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("rate limited by chat api, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("chat api error {code}: {description}")]
    Api { code: u16, description: String },

    #[error("chat api transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to decode chat api response: {0}")]
    Decode(String),
}

impl ChatError {
    /// Server-provided backoff hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// The API refused because the target already has the requested value.
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::Api { code: 400, description } if description.contains("not modified"))
    }

    /// Strip the request URL (it embeds the bot token) before wrapping.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}
