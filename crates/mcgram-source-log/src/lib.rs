//! mcgram-source-log: game server log source.
//! Tails the server's log file across rotation, keeps the chat-worthy
//! lines, and assembles them into size-bounded text batches.

pub mod classify;
pub mod source;
pub mod watcher;

pub use classify::{clean, should_emit};
pub use source::{BatchOutcome, assemble};
pub use watcher::{LogLine, LogTailer, TailCursor, TailState};
