//! Player-presence sampling: the local console and an optional remote peer.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use mcgram_core::types::{PresenceReading, PresenceSample, PresenceSource};
use mcgram_rcon::ConsoleCommandRunner;
use regex::Regex;
use reqwest::Url;

use crate::console;

pub const LIST_COMMAND: &str = "list";

const REMOTE_TIMEOUT: Duration = Duration::from_secs(3);

static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("count regex is valid"));

/// First run of digits in a `list` response. No digits means the server
/// answered without a player count, which only happens while it sleeps.
pub fn parse_player_count(response: &str) -> PresenceReading {
    COUNT_RE
        .find(response)
        .and_then(|m| m.as_str().parse().ok())
        .map_or(PresenceReading::Asleep, PresenceReading::Count)
}

/// Who is online on the peer server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOnline {
    pub count: u32,
    /// Empty when the peer reports a bare count.
    pub names: Vec<String>,
}

/// Accepts `["Alice","Bob"]` or `2`. Anything else is malformed.
pub fn parse_remote_payload(body: &str) -> Option<RemoteOnline> {
    match serde_json::from_str::<serde_json::Value>(body).ok()? {
        serde_json::Value::Array(items) => {
            let names = items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(name) => Some(name),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?;
            Some(RemoteOnline {
                count: u32::try_from(names.len()).ok()?,
                names,
            })
        }
        serde_json::Value::Number(n) => Some(RemoteOnline {
            count: u32::try_from(n.as_u64()?).ok()?,
            names: Vec::new(),
        }),
        _ => None,
    }
}

/// HTTP endpoint of a peer server's online list.
#[derive(Debug, Clone)]
pub struct RemotePeer {
    http: reqwest::Client,
    url: Url,
}

impl RemotePeer {
    pub fn new(url: Url) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REMOTE_TIMEOUT).build()?;
        Ok(Self { http, url })
    }

    /// `None` on any network, status, or payload failure.
    pub async fn fetch(&self) -> Option<RemoteOnline> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);
        let body = match response {
            Ok(response) => response.text().await,
            Err(e) => Err(e),
        };
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "remote online list unavailable");
                return None;
            }
        };
        let online = parse_remote_payload(&body);
        if online.is_none() {
            tracing::debug!(url = %self.url, "remote online list is malformed");
        }
        online
    }
}

pub struct PresenceSampler<R> {
    console: Arc<R>,
    remote: Option<RemotePeer>,
}

impl<R: ConsoleCommandRunner + 'static> PresenceSampler<R> {
    pub fn new(console: Arc<R>, remote: Option<RemotePeer>) -> Self {
        Self { console, remote }
    }

    /// Local reading is always present; the remote one only when the peer
    /// is configured and answered.
    pub async fn sample(&self) -> PresenceSample {
        let local = match console::execute(&self.console, LIST_COMMAND).await {
            Ok(response) => parse_player_count(&response),
            Err(e) => {
                tracing::debug!(error = %e, "local player count unavailable");
                PresenceReading::Unreachable
            }
        };
        let mut sample = PresenceSample::new().with(PresenceSource::Local, local);
        if let Some(online) = self.remote_online().await {
            sample.insert(PresenceSource::Remote, PresenceReading::Count(online.count));
        }
        sample
    }

    pub async fn remote_online(&self) -> Option<RemoteOnline> {
        self.remote.as_ref()?.fetch().await
    }
}
