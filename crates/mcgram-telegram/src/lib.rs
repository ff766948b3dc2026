//! mcgram-telegram: chat surface IO boundary.
//! A thin Bot API client plus the `ChatSurface` trait the runtime talks to.

pub mod api;
pub mod error;
pub mod types;

pub use api::{ChatSurface, DEFAULT_API_BASE, TelegramBot};
pub use error::ChatError;
pub use types::{Chat, ChatId, Message, Update, User};
