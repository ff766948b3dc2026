//! mcgram: Minecraft server <-> Telegram group bridge.
//! Single-process binary: log relay, title updater and chat forwarding.

use clap::Parser;

mod bridge;
mod cli;
mod config;
mod console;
mod daemon;
mod error;
mod log_loop;
mod presence;
mod repl;
#[cfg(test)]
mod test_support;
mod title_loop;
mod updates;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Run(opts) => {
            let filter = std::env::var("MCGRAM_LOG")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string());
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
                .init();

            tracing::info!("mcgram starting");

            let config = config::BridgeConfig::from_opts(opts)?;
            daemon::run_daemon(config).await?;
        }
        cli::Command::Rcon(opts) => {
            tokio::task::spawn_blocking(move || repl::cmd_rcon(&opts)).await??;
        }
    }

    Ok(())
}
