//! Title loop: keeps the chat title in step with who is online.

use std::sync::Arc;
use std::time::Duration;

use mcgram_core::title::compose_title;
use mcgram_core::types::PresenceSample;
use mcgram_rcon::ConsoleCommandRunner;
use mcgram_telegram::{ChatError, ChatId, ChatSurface};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{MissedTickBehavior, interval};

use crate::error::{BridgeError, Disposition};
use crate::presence::PresenceSampler;

/// Remembers the last sample and title that reached the chat so unchanged
/// presence never produces a title push, and neither do two samples that
/// render the same title.
pub struct TitleReconciler<G = StdRng> {
    chat: ChatId,
    base_title: String,
    last_pushed: Option<PresenceSample>,
    last_title: Option<String>,
    rng: G,
}

impl TitleReconciler<StdRng> {
    pub fn new(chat: ChatId, base_title: impl Into<String>) -> Self {
        Self::with_rng(chat, base_title, StdRng::from_entropy())
    }
}

impl<G: Rng> TitleReconciler<G> {
    pub fn with_rng(chat: ChatId, base_title: impl Into<String>, rng: G) -> Self {
        Self {
            chat,
            base_title: base_title.into(),
            last_pushed: None,
            last_title: None,
            rng,
        }
    }

    /// Push a new title if `sample` differs from the last pushed one and
    /// renders a different title. Returns the title that was set, or `None`
    /// when nothing was pushed. On failure the baseline stays put so the next
    /// tick retries.
    pub async fn reconcile<C: ChatSurface + ?Sized>(
        &mut self,
        chat_surface: &C,
        sample: PresenceSample,
    ) -> Result<Option<String>, ChatError> {
        if self.last_pushed.as_ref() == Some(&sample) {
            return Ok(None);
        }
        let title = compose_title(&self.base_title, &sample, &mut self.rng);
        if self.last_title.as_deref() == Some(title.as_str()) {
            self.last_pushed = Some(sample);
            return Ok(None);
        }
        match chat_surface.set_title(self.chat, &title).await {
            Ok(()) => {}
            // The chat already carries this title (e.g. after a restart).
            Err(e) if e.is_not_modified() => tracing::debug!(%title, "title already set"),
            Err(e) => return Err(e),
        }
        self.last_pushed = Some(sample);
        self.last_title = Some(title.clone());
        Ok(Some(title))
    }
}

pub async fn run_title_loop<R, C>(
    sampler: PresenceSampler<R>,
    chat_surface: Arc<C>,
    mut reconciler: TitleReconciler,
    period: Duration,
) where
    R: ConsoleCommandRunner + 'static,
    C: ChatSurface + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let sample = sampler.sample().await;
        match reconciler.reconcile(chat_surface.as_ref(), sample).await {
            Ok(Some(title)) => tracing::info!(%title, "chat title updated"),
            Ok(None) => {}
            Err(e) => {
                if let Disposition::Backoff(wait) = BridgeError::from(e).report("title update") {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
