//! Log loop: tail the server log and relay each tick's batch to the chat.

use std::sync::Arc;
use std::time::Duration;

use mcgram_source_log::{BatchOutcome, LogTailer, assemble};
use mcgram_telegram::{ChatId, ChatSurface};
use tokio::time::{MissedTickBehavior, interval};

use crate::error::{BridgeError, Disposition};

/// One tick: read new lines, build a batch, send it if it is in bounds.
///
/// Returns the number of relayed lines, or `None` if nothing was sent.
/// The cursor advances before the send, so a failed send loses that batch
/// rather than repeating it.
pub async fn log_tick<C: ChatSurface + ?Sized>(
    tailer: &mut LogTailer,
    chat_surface: &C,
    chat: ChatId,
) -> Result<Option<usize>, BridgeError> {
    let lines = tailer.poll()?;
    match assemble(&lines) {
        BatchOutcome::Idle => Ok(None),
        BatchOutcome::Dropped {
            lines_read,
            rejection,
        } => {
            tracing::debug!(lines_read, %rejection, "log batch dropped");
            Ok(None)
        }
        BatchOutcome::Ready(batch) => {
            chat_surface.send_text(chat, &batch.text()).await?;
            Ok(Some(batch.lines().len()))
        }
    }
}

pub async fn run_log_loop<C: ChatSurface + 'static>(
    mut tailer: LogTailer,
    chat_surface: Arc<C>,
    chat: ChatId,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match log_tick(&mut tailer, chat_surface.as_ref(), chat).await {
            Ok(Some(lines)) => tracing::debug!(lines, "log batch relayed"),
            Ok(None) => {}
            Err(e) => {
                if let Disposition::Backoff(wait) = e.report("log relay") {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
