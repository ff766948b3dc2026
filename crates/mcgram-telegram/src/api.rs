//! ChatSurface trait and TelegramBot (Bot API over HTTPS).

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::ChatError;
use crate::types::{ApiResponse, ChatId, Update};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Server-side wait for `getUpdates` long polling.
pub const LONG_POLL_SECS: u64 = 30;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Backoff used when the API rate-limits without saying for how long.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Everything the bridge needs from the chat. Enables mock injection for testing.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Post a silent message (no notification, no link preview).
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), ChatError>;

    /// Post an ordinary reply to a user command.
    async fn reply(&self, chat: ChatId, text: &str) -> Result<(), ChatError>;

    async fn set_title(&self, chat: ChatId, title: &str) -> Result<(), ChatError>;

    async fn delete_message(&self, chat: ChatId, message_id: i64) -> Result<(), ChatError>;
}

/// Real Bot API client.
pub struct TelegramBot {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramBot {
    pub fn new(token: impl Into<String>) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ChatError::transport)?;
        Ok(Self {
            http,
            base_url: DEFAULT_API_BASE.to_string(),
            token: token.into(),
        })
    }

    /// Point at a self-hosted Bot API server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, ChatError> {
        let mut request = self.http.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(ChatError::transport)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(ChatError::transport)?;
        tracing::trace!(method, status, "chat api call");
        parse_response(status, &text)
    }

    async fn send_message(&self, chat: ChatId, text: &str, silent: bool) -> Result<(), ChatError> {
        let body = json!({
            "chat_id": chat,
            "text": text,
            "disable_notification": silent,
            "disable_web_page_preview": true,
        });
        let _: serde_json::Value = self.call("sendMessage", &body, None).await?;
        Ok(())
    }

    /// Long-poll for inbound updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, ChatError> {
        let body = json!({
            "offset": offset,
            "timeout": LONG_POLL_SECS,
            "allowed_updates": ["message"],
        });
        let timeout = Duration::from_secs(LONG_POLL_SECS) + REQUEST_TIMEOUT;
        self.call("getUpdates", &body, Some(timeout)).await
    }
}

#[async_trait]
impl ChatSurface for TelegramBot {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), ChatError> {
        self.send_message(chat, text, true).await
    }

    async fn reply(&self, chat: ChatId, text: &str) -> Result<(), ChatError> {
        self.send_message(chat, text, false).await
    }

    async fn set_title(&self, chat: ChatId, title: &str) -> Result<(), ChatError> {
        let body = json!({ "chat_id": chat, "title": title });
        let _: bool = self.call("setChatTitle", &body, None).await?;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message_id: i64) -> Result<(), ChatError> {
        let body = json!({ "chat_id": chat, "message_id": message_id });
        let _: bool = self.call("deleteMessage", &body, None).await?;
        Ok(())
    }
}

/// Map a Bot API envelope to the result or a typed error.
pub(crate) fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ChatError> {
    let envelope: ApiResponse<T> = serde_json::from_str(body)
        .map_err(|e| ChatError::Decode(format!("HTTP {status}: {e}")))?;

    if envelope.ok {
        return envelope
            .result
            .ok_or_else(|| ChatError::Decode("ok response without result".into()));
    }

    let code = envelope.error_code.unwrap_or(status);
    let retry_after = envelope.parameters.and_then(|p| p.retry_after);
    if code == 429 || retry_after.is_some() {
        return Err(ChatError::RateLimited {
            retry_after: retry_after.map_or(DEFAULT_RETRY_AFTER, Duration::from_secs),
        });
    }
    Err(ChatError::Api {
        code,
        description: envelope
            .description
            .unwrap_or_else(|| "no description".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_layout() {
        let bot = TelegramBot::new("123:abc")
            .expect("client")
            .with_base_url("http://localhost:8081/");
        assert_eq!(
            bot.method_url("sendMessage"),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn ok_response_yields_result() {
        let title_set: bool = parse_response(200, r#"{"ok":true,"result":true}"#).expect("ok");
        assert!(title_set);
    }

    #[test]
    fn ok_without_result_is_decode_error() {
        let err = parse_response::<bool>(200, r#"{"ok":true}"#).expect_err("no result");
        assert!(matches!(err, ChatError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn rate_limit_carries_retry_after() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 7","parameters":{"retry_after":7}}"#;
        let err = parse_response::<bool>(429, body).expect_err("limited");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn rate_limit_without_hint_uses_default() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests"}"#;
        let err = parse_response::<bool>(429, body).expect_err("limited");
        assert_eq!(err.retry_after(), Some(DEFAULT_RETRY_AFTER));
    }

    #[test]
    fn api_error_keeps_description() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat title is not modified"}"#;
        let err = parse_response::<bool>(400, body).expect_err("bad request");
        match err {
            ChatError::Api { code, description } => {
                assert_eq!(code, 400);
                assert!(description.contains("not modified"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn not_modified_is_recognised() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat title is not modified"}"#;
        let err = parse_response::<bool>(400, body).expect_err("bad request");
        assert!(err.is_not_modified());

        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let err = parse_response::<bool>(400, body).expect_err("bad request");
        assert!(!err.is_not_modified());
    }

    #[test]
    fn garbage_body_is_decode_error() {
        let err = parse_response::<bool>(502, "<html>Bad Gateway</html>").expect_err("html");
        match err {
            ChatError::Decode(msg) => assert!(msg.starts_with("HTTP 502")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn updates_decode() {
        let body = r#"{"ok":true,"result":[{"update_id":1,"message":{"message_id":2,"chat":{"id":-5},"text":"hi","date":0}}]}"#;
        let updates: Vec<Update> = parse_response(200, body).expect("updates");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 1);
    }
}
