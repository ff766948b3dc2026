//! mcgram-rcon: game console IO boundary.
//! Source RCON framing plus a connection-per-command executor.
//! No business logic; callers decide what a failure means.

pub mod error;
pub mod executor;
pub mod packet;

pub use error::RconError;
pub use executor::{ConsoleCommandRunner, DEFAULT_RCON_PORT, RconExecutor};
pub use packet::{MAX_COMMAND_BYTES, Packet};
