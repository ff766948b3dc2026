//! CLI definition using clap derive. Every bridge setting can also come
//! from the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mcgram_rcon::{DEFAULT_RCON_PORT, RconExecutor};

#[derive(Parser)]
#[command(name = "mcgram", about = "Minecraft server <-> Telegram group bridge", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the bridge (log relay, title updater, chat forwarding)
    Run(RunOpts),
    /// Send console commands; starts a prompt when no command is given
    Rcon(RconOpts),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConsoleOpts {
    /// Console (RCON) host
    #[arg(long, env = "RCON_HOST", default_value = "127.0.0.1")]
    pub rcon_host: String,

    /// Console (RCON) port
    #[arg(long, env = "RCON_PORT", default_value_t = DEFAULT_RCON_PORT)]
    pub rcon_port: u16,

    /// Console (RCON) password
    #[arg(long, env = "RCON_PASSWORD", default_value = "", hide_env_values = true)]
    pub rcon_password: String,

    /// Connect/read timeout for one console command, in milliseconds
    #[arg(long, env = "RCON_TIMEOUT_MS", default_value = "5000")]
    pub rcon_timeout_ms: u64,
}

impl ConsoleOpts {
    pub fn executor(&self) -> RconExecutor {
        RconExecutor::new(self.rcon_host.clone(), self.rcon_port)
            .with_password(self.rcon_password.clone())
            .with_timeout(Duration::from_millis(self.rcon_timeout_ms.max(1)))
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunOpts {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Telegram chat the bridge serves
    #[arg(long, env = "CHAT_ID", allow_negative_numbers = true)]
    pub chat_id: i64,

    /// Game server log file to relay
    #[arg(long, env = "LOG_FILE_PATH")]
    pub log_file: PathBuf,

    /// Base chat title; empty disables title updates
    #[arg(long, env = "CHAT_TITLE", default_value = "")]
    pub chat_title: String,

    /// HTTP endpoint returning a peer server's online players as JSON
    #[arg(long, env = "REMOTE_ONLINE_LIST_ENDPOINT")]
    pub remote_online_list: Option<String>,

    /// Bot API base URL (for self-hosted API servers)
    #[arg(long, env = "TELEGRAM_BOT_BASE_URL")]
    pub telegram_base_url: Option<String>,

    #[command(flatten)]
    pub console: ConsoleOpts,

    /// Log poll interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub log_interval_ms: u64,

    /// Title reconcile interval in milliseconds
    #[arg(long, default_value = "2000")]
    pub title_interval_ms: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RconOpts {
    #[command(flatten)]
    pub console: ConsoleOpts,

    /// Command to run (e.g. `list`)
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}
