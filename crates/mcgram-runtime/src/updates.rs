//! Update loop: long-poll the Bot API and dispatch each inbound message.

use std::sync::Arc;
use std::time::Duration;

use mcgram_rcon::ConsoleCommandRunner;
use mcgram_telegram::{ChatSurface, Message, TelegramBot, Update};

use crate::bridge::Bridge;
use crate::error::{BridgeError, Disposition};

/// Pause after a failed `getUpdates` with no rate-limit hint.
const UPDATE_RETRY: Duration = Duration::from_secs(5);

/// Keeps only the latest "chat title changed" notice in the chat.
#[derive(Debug, Default)]
pub struct TitleNoticeTracker {
    last: Option<i64>,
}

impl TitleNoticeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a title-change notice. Returns the previous notice to delete.
    pub fn observe(&mut self, message: &Message) -> Option<i64> {
        if message.new_chat_title.is_none() {
            return None;
        }
        self.last.replace(message.message_id)
    }
}

/// Route one update: title notices to the tracker, text to the bridge.
pub async fn dispatch<R, C>(
    bridge: &Bridge<R, C>,
    notices: &mut TitleNoticeTracker,
    update: &Update,
) -> Result<(), BridgeError>
where
    R: ConsoleCommandRunner + 'static,
    C: ChatSurface + 'static,
{
    let Some(message) = update.message.as_ref() else {
        return Ok(());
    };

    if message.new_chat_title.is_some() {
        if message.chat.id != bridge.chat() {
            return Ok(());
        }
        if let Some(previous) = notices.observe(message) {
            if let Err(e) = bridge
                .chat_surface()
                .delete_message(bridge.chat(), previous)
                .await
            {
                tracing::debug!(error = %e, message_id = previous, "old title notice not deleted");
            }
        }
        return Ok(());
    }

    bridge.handle(message).await
}

pub async fn run_update_loop<R, C>(bot: Arc<TelegramBot>, bridge: Bridge<R, C>)
where
    R: ConsoleCommandRunner + 'static,
    C: ChatSurface + 'static,
{
    let mut offset: Option<i64> = None;
    let mut notices = TitleNoticeTracker::new();

    loop {
        let updates = match bot.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                let wait = match BridgeError::from(e).report("fetching updates") {
                    Disposition::Backoff(wait) => wait,
                    _ => UPDATE_RETRY,
                };
                tokio::time::sleep(wait).await;
                continue;
            }
        };

        for update in &updates {
            offset = Some(update.update_id + 1);
            if let Err(e) = dispatch(&bridge, &mut notices, update).await {
                e.report("handling update");
            }
        }
    }
}
