//! Chat → server: command handling and message forwarding.

use std::sync::Arc;
use std::time::Duration;

use mcgram_rcon::ConsoleCommandRunner;
use mcgram_telegram::{ChatId, ChatSurface, Message};
use tokio::task::JoinHandle;

use crate::console::{self, say_command};
use crate::error::BridgeError;
use crate::presence::{LIST_COMMAND, RemotePeer};

/// How long `/allow` keeps the whitelist off.
pub const ALLOW_WINDOW: Duration = Duration::from_secs(60);

/// Shown in `/list` for a server that did not answer.
const SLEEPING: &str = "zzZ";

const ORIGIN: &str = "Telegram";

const TIME_KEYWORDS: [&str; 4] = ["noon", "day", "night", "midnight"];

const TIME_USAGE: &str = "Usage: /time <noon|day|night|midnight|ticks>, e.g. /time noon or /time 0";

const TIME_FAILED: &str = "Could not set the time, the server may be asleep.";

const ALLOW_FAILED: &str = "Could not turn the whitelist off, the server may be asleep.";

/// What an inbound text asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<'a> {
    Start,
    List,
    Allow,
    Time(Vec<&'a str>),
    /// A command the bridge does not know; never forwarded.
    Unknown(&'a str),
    /// Plain chat text to forward to the server.
    Text(&'a str),
}

/// Split `/cmd@botname arg...` into its command and arguments.
pub fn parse_inbound(text: &str) -> Inbound<'_> {
    let Some(rest) = text.strip_prefix('/') else {
        return Inbound::Text(text);
    };
    let mut words = rest.split_whitespace();
    let head = words.next().unwrap_or_default();
    let name = head.split('@').next().unwrap_or_default();
    match name {
        "start" => Inbound::Start,
        "list" => Inbound::List,
        "allow" => Inbound::Allow,
        "time" => Inbound::Time(words.collect()),
        other => Inbound::Unknown(other),
    }
}

/// Validate `/time` arguments: exactly one, a keyword or an integer tick.
pub fn parse_time_arg(args: &[&str]) -> Option<String> {
    let [arg] = args else {
        return None;
    };
    let arg = arg.trim().to_lowercase();
    if TIME_KEYWORDS.contains(&arg.as_str()) || arg.parse::<i64>().is_ok() {
        Some(arg)
    } else {
        None
    }
}

pub struct Bridge<R, C> {
    console: Arc<R>,
    chat_surface: Arc<C>,
    remote: Option<RemotePeer>,
    chat: ChatId,
    base_title: String,
    allow_window: Duration,
}

impl<R, C> Bridge<R, C>
where
    R: ConsoleCommandRunner + 'static,
    C: ChatSurface + 'static,
{
    pub fn new(
        console: Arc<R>,
        chat_surface: Arc<C>,
        remote: Option<RemotePeer>,
        chat: ChatId,
        base_title: impl Into<String>,
    ) -> Self {
        Self {
            console,
            chat_surface,
            remote,
            chat,
            base_title: base_title.into(),
            allow_window: ALLOW_WINDOW,
        }
    }

    pub fn chat_surface(&self) -> &C {
        &self.chat_surface
    }

    pub fn chat(&self) -> ChatId {
        self.chat
    }

    /// Act on one inbound text message. Only the configured chat is served,
    /// except for `/start`.
    pub async fn handle(&self, message: &Message) -> Result<(), BridgeError> {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let inbound = parse_inbound(text);
        let origin = message.chat.id;
        if origin != self.chat && inbound != Inbound::Start {
            tracing::debug!(chat = %origin, "ignoring message from another chat");
            return Ok(());
        }

        match inbound {
            Inbound::Start => self.greet(message).await,
            Inbound::List => self.list(origin).await,
            Inbound::Allow => self.allow(origin).await.map(|_| ()),
            Inbound::Time(args) => self.set_time(origin, &args).await,
            Inbound::Unknown(name) => {
                tracing::debug!(command = name, "unknown command");
                Ok(())
            }
            Inbound::Text(body) => {
                self.forward(message, body).await;
                Ok(())
            }
        }
    }

    async fn greet(&self, message: &Message) -> Result<(), BridgeError> {
        let name = message
            .from
            .as_ref()
            .map_or("there", |user| user.first_name.as_str());
        self.chat_surface
            .reply(message.chat.id, &format!("Hi {name}!"))
            .await?;
        Ok(())
    }

    async fn list(&self, chat: ChatId) -> Result<(), BridgeError> {
        let local = match console::execute(&self.console, LIST_COMMAND).await {
            Ok(response) if !response.trim().is_empty() => response.trim().to_string(),
            Ok(_) => SLEEPING.to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "list failed");
                SLEEPING.to_string()
            }
        };
        let heading = if self.base_title.is_empty() {
            "Server"
        } else {
            self.base_title.as_str()
        };
        let mut text = format!("{heading}:\n{local}");

        if let Some(peer) = &self.remote {
            let remote = match peer.fetch().await {
                Some(online) if !online.names.is_empty() => online.names.join(", "),
                Some(online) => format!("{} online", online.count),
                None => SLEEPING.to_string(),
            };
            text.push_str(&format!("\n\nRemote:\n{remote}"));
        }

        self.chat_surface.reply(chat, &text).await?;
        Ok(())
    }

    /// Turn the whitelist off and schedule turning it back on. Returns the
    /// re-enable task when the whitelist was actually turned off.
    pub async fn allow(&self, chat: ChatId) -> Result<Option<JoinHandle<()>>, BridgeError> {
        if let Err(e) = console::execute(&self.console, "whitelist off").await {
            tracing::debug!(error = %e, "whitelist off failed");
            self.chat_surface.reply(chat, ALLOW_FAILED).await?;
            return Ok(None);
        }

        let runner = Arc::clone(&self.console);
        let window = self.allow_window;
        let restore = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            match console::execute(&runner, "whitelist on").await {
                Ok(_) => tracing::info!("whitelist re-enabled"),
                Err(e) => tracing::warn!(error = %e, "failed to re-enable whitelist"),
            }
        });

        tracing::info!(window_secs = window.as_secs(), "whitelist disabled");
        self.chat_surface
            .reply(
                chat,
                &format!(
                    "Whitelist is off, it will be turned back on in {}s.",
                    window.as_secs()
                ),
            )
            .await?;
        Ok(Some(restore))
    }

    async fn set_time(&self, chat: ChatId, args: &[&str]) -> Result<(), BridgeError> {
        let Some(arg) = parse_time_arg(args) else {
            self.chat_surface.reply(chat, TIME_USAGE).await?;
            return Ok(());
        };
        match console::execute(&self.console, format!("time set {arg}")).await {
            Ok(response) => {
                let response = response.trim();
                if !response.is_empty() {
                    self.chat_surface.reply(chat, response).await?;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "time set failed");
                self.chat_surface.reply(chat, TIME_FAILED).await?;
            }
        }
        Ok(())
    }

    /// Relay plain chat text into the game. Failures are dropped.
    async fn forward(&self, message: &Message, body: &str) {
        let Some(user) = message.from.as_ref() else {
            return;
        };
        let command = say_command(ORIGIN, &user.display_name(), body);
        if let Err(e) = console::execute(&self.console, command).await {
            tracing::debug!(error = %e, "message not forwarded");
        }
    }
}
