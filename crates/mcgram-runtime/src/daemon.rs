//! Daemon wiring: build the clients, spawn the three loops, wait for a
//! shutdown signal.

use std::sync::Arc;

use mcgram_source_log::LogTailer;
use mcgram_telegram::TelegramBot;
use tokio::task::JoinSet;

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::log_loop::run_log_loop;
use crate::presence::{PresenceSampler, RemotePeer};
use crate::title_loop::{TitleReconciler, run_title_loop};
use crate::updates::run_update_loop;

pub async fn run_daemon(config: BridgeConfig) -> anyhow::Result<()> {
    let console = Arc::new(config.console.clone());
    let bot = Arc::new(
        TelegramBot::new(config.bot_token.as_str())?.with_base_url(config.telegram_base_url.as_str()),
    );
    let remote = config
        .remote_online_list
        .clone()
        .map(RemotePeer::new)
        .transpose()?;

    tracing::info!(
        chat = %config.chat,
        log_file = %config.log_file.display(),
        console = %config.console.addr(),
        remote = remote.is_some(),
        title = config.title_enabled(),
        "bridge starting"
    );

    let mut tasks = JoinSet::new();

    let tailer = LogTailer::new(&config.log_file);
    let log_bot = Arc::clone(&bot);
    let (chat, log_interval) = (config.chat, config.log_interval);
    tasks.spawn(async move {
        run_log_loop(tailer, log_bot, chat, log_interval).await;
        "log loop"
    });

    if config.title_enabled() {
        let sampler = PresenceSampler::new(Arc::clone(&console), remote.clone());
        let reconciler = TitleReconciler::new(config.chat, config.base_title.clone());
        let title_bot = Arc::clone(&bot);
        let title_interval = config.title_interval;
        tasks.spawn(async move {
            run_title_loop(sampler, title_bot, reconciler, title_interval).await;
            "title loop"
        });
    }

    let bridge = Bridge::new(
        console,
        Arc::clone(&bot),
        remote,
        config.chat,
        config.base_title.clone(),
    );
    tasks.spawn(async move {
        run_update_loop(bot, bridge).await;
        "update loop"
    });

    tokio::select! {
        signal = shutdown_signal() => signal?,
        Some(joined) = tasks.join_next() => match joined {
            Ok(name) => tracing::warn!(task = name, "exited unexpectedly"),
            Err(e) => tracing::error!(error = %e, "task failed"),
        },
    }

    tasks.shutdown().await;
    tracing::info!("bridge stopped");
    Ok(())
}

/// Resolves on ctrl-c, or SIGTERM on unix.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            ctrl_c = tokio::signal::ctrl_c() => {
                ctrl_c?;
                tracing::info!("received ctrl-c, shutting down");
            }
            _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("received ctrl-c, shutting down");
    }

    Ok(())
}
