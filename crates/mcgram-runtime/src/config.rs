//! Validated bridge configuration, built once at startup from `RunOpts`.

use std::path::PathBuf;
use std::time::Duration;

use mcgram_rcon::RconExecutor;
use mcgram_telegram::{ChatId, DEFAULT_API_BASE};
use reqwest::Url;

use crate::cli::RunOpts;
use crate::error::BridgeError;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub bot_token: String,
    pub chat: ChatId,
    pub log_file: PathBuf,
    /// Base for the chat title; empty disables title updates.
    pub base_title: String,
    pub remote_online_list: Option<Url>,
    pub telegram_base_url: String,
    pub console: RconExecutor,
    pub log_interval: Duration,
    pub title_interval: Duration,
}

impl BridgeConfig {
    pub fn from_opts(opts: RunOpts) -> Result<Self, BridgeError> {
        let bot_token = opts.bot_token.trim().to_string();
        if bot_token.is_empty() {
            return Err(BridgeError::Config("BOT_TOKEN is empty".into()));
        }
        if opts.log_interval_ms == 0 || opts.title_interval_ms == 0 {
            return Err(BridgeError::Config("poll intervals must be non-zero".into()));
        }

        let remote_online_list = non_empty(opts.remote_online_list)
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    BridgeError::Config(format!("REMOTE_ONLINE_LIST_ENDPOINT {raw:?}: {e}"))
                })
            })
            .transpose()?;

        let telegram_base_url = match non_empty(opts.telegram_base_url) {
            Some(raw) => {
                Url::parse(&raw).map_err(|e| {
                    BridgeError::Config(format!("TELEGRAM_BOT_BASE_URL {raw:?}: {e}"))
                })?;
                raw
            }
            None => DEFAULT_API_BASE.to_string(),
        };

        Ok(Self {
            bot_token,
            chat: ChatId(opts.chat_id),
            log_file: opts.log_file,
            base_title: opts.chat_title.trim().to_string(),
            remote_online_list,
            telegram_base_url,
            console: opts.console.executor(),
            log_interval: Duration::from_millis(opts.log_interval_ms),
            title_interval: Duration::from_millis(opts.title_interval_ms),
        })
    }

    pub fn title_enabled(&self) -> bool {
        !self.base_title.is_empty()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
