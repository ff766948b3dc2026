//! mcgram-core: domain types shared by the log pipeline and the title updater.
//! Pure logic only: no IO, no async.

pub mod batch;
pub mod title;
pub mod types;

pub use batch::{BatchRejection, MAX_BATCH_CHARS, MIN_BATCH_CHARS, TextBatch};
pub use title::compose_title;
pub use types::{PresenceReading, PresenceSample, PresenceSource};
