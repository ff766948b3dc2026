//! Fakes shared by the runtime's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mcgram_rcon::{ConsoleCommandRunner, RconError};
use mcgram_telegram::{ChatError, ChatId, ChatSurface};

fn unreachable_error() -> RconError {
    RconError::ConnectFailed {
        addr: "127.0.0.1:25575".into(),
        source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
    }
}

/// Scripted console. Scripted answers are consumed first (`None` = connection
/// refused), then fixed replies per command, then an empty response.
#[derive(Default)]
pub struct FakeConsole {
    replies: HashMap<String, String>,
    script: Mutex<VecDeque<Option<String>>>,
    unreachable: bool,
    commands: Mutex<Vec<String>>,
}

impl FakeConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_reply(mut self, command: &str, reply: &str) -> Self {
        self.replies.insert(command.to_string(), reply.to_string());
        self
    }

    pub fn with_script(self, answers: &[Option<&str>]) -> Self {
        *self.script.lock().expect("lock") =
            answers.iter().map(|a| a.map(String::from)).collect();
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("lock").clone()
    }
}

impl ConsoleCommandRunner for FakeConsole {
    fn run(&self, command: &str) -> Result<String, RconError> {
        self.commands.lock().expect("lock").push(command.to_string());
        if let Some(answer) = self.script.lock().expect("lock").pop_front() {
            return answer.ok_or_else(unreachable_error);
        }
        if self.unreachable {
            return Err(unreachable_error());
        }
        Ok(self.replies.get(command).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    Text(ChatId, String),
    Reply(ChatId, String),
    Title(ChatId, String),
    Delete(ChatId, i64),
}

/// Records every chat call. Title pushes can be made to fail.
#[derive(Default)]
pub struct SpyChat {
    calls: Mutex<Vec<ChatCall>>,
    failing_titles: AtomicUsize,
}

impl SpyChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` title pushes with a transient API error.
    pub fn fail_next_titles(&self, n: usize) {
        self.failing_titles.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ChatCall::Title(_, t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ChatCall::Text(_, t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ChatCall::Reply(_, t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ChatCall) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl ChatSurface for SpyChat {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), ChatError> {
        self.record(ChatCall::Text(chat, text.to_string()));
        Ok(())
    }

    async fn reply(&self, chat: ChatId, text: &str) -> Result<(), ChatError> {
        self.record(ChatCall::Reply(chat, text.to_string()));
        Ok(())
    }

    async fn set_title(&self, chat: ChatId, title: &str) -> Result<(), ChatError> {
        let failing = self
            .failing_titles
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ChatError::Api {
                code: 500,
                description: "Internal Server Error".into(),
            });
        }
        self.record(ChatCall::Title(chat, title.to_string()));
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message_id: i64) -> Result<(), ChatError> {
        self.record(ChatCall::Delete(chat, message_id));
        Ok(())
    }
}
