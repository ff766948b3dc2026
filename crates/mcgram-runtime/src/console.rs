//! Async access to the blocking console client.

use std::sync::Arc;

use mcgram_rcon::{ConsoleCommandRunner, MAX_COMMAND_BYTES, RconError};

/// Run one console command on the blocking pool.
pub async fn execute<R: ConsoleCommandRunner + 'static>(
    runner: &Arc<R>,
    command: impl Into<String>,
) -> Result<String, RconError> {
    let runner = Arc::clone(runner);
    let command = command.into();
    tokio::task::spawn_blocking(move || runner.run(&command))
        .await
        .map_err(|e| RconError::Io(std::io::Error::other(e)))?
}

/// `say [origin][name] text`, flattened to one line and cut to the
/// console's command limit on a char boundary.
pub fn say_command(origin: &str, name: &str, text: &str) -> String {
    let text = text.replace(['\r', '\n'], " ");
    let mut command = format!("say [{origin}][{name}] {text}");
    if command.len() > MAX_COMMAND_BYTES {
        let mut cut = MAX_COMMAND_BYTES;
        while !command.is_char_boundary(cut) {
            cut -= 1;
        }
        command.truncate(cut);
    }
    command
}
