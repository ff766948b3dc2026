//! ConsoleCommandRunner trait and RconExecutor (sync TCP client).
//! One connection per command; nothing is pooled.

use std::io;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::RconError;
use crate::packet::{
    MAX_COMMAND_BYTES, PACKET_AUTH_RESPONSE, PACKET_COMMAND, PACKET_LOGIN, Packet, read_packet,
    write_packet,
};

pub const DEFAULT_RCON_PORT: u16 = 25575;
pub const DEFAULT_RCON_TIMEOUT: Duration = Duration::from_secs(5);

const LOGIN_REQUEST_ID: i32 = 1;
const COMMAND_REQUEST_ID: i32 = 2;
/// Request id the server uses to signal a rejected password.
const AUTH_REJECTED_ID: i32 = -1;
/// Some servers send an empty response-value frame ahead of the auth response.
const MAX_LOGIN_FRAMES: usize = 2;

/// Trait for executing console commands. Enables mock injection for testing.
pub trait ConsoleCommandRunner: Send + Sync {
    fn run(&self, command: &str) -> Result<String, RconError>;
}

impl<T: ConsoleCommandRunner + ?Sized> ConsoleCommandRunner for &T {
    fn run(&self, command: &str) -> Result<String, RconError> {
        (**self).run(command)
    }
}

/// Real console executor over Source RCON.
#[derive(Debug, Clone)]
pub struct RconExecutor {
    host: String,
    port: u16,
    password: String,
    timeout: Duration,
}

impl RconExecutor {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: String::new(),
            timeout: DEFAULT_RCON_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn connect(&self) -> Result<TcpStream, RconError> {
        let addr = self.addr();
        let resolved = addr
            .to_socket_addrs()
            .map_err(|source| RconError::ConnectFailed {
                addr: addr.clone(),
                source,
            })?;

        let mut last_err = None;
        for sock_addr in resolved {
            match TcpStream::connect_timeout(&sock_addr, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }

        let source = last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing")
        });
        if source.kind() == io::ErrorKind::TimedOut {
            return Err(RconError::Timeout(self.timeout));
        }
        Err(RconError::ConnectFailed { addr, source })
    }

    fn login(&self, stream: &mut TcpStream) -> Result<(), RconError> {
        let request = Packet::new(LOGIN_REQUEST_ID, PACKET_LOGIN, self.password.as_bytes());
        write_packet(stream, &request).map_err(|e| RconError::from_io(e, self.timeout))?;

        for _ in 0..MAX_LOGIN_FRAMES {
            let reply = read_packet(stream).map_err(|e| RconError::from_io(e, self.timeout))?;
            if reply.kind != PACKET_AUTH_RESPONSE {
                continue;
            }
            return match reply.request_id {
                LOGIN_REQUEST_ID => Ok(()),
                AUTH_REJECTED_ID => Err(RconError::AuthFailed),
                other => Err(RconError::Protocol(format!(
                    "auth response for unknown request id {other}"
                ))),
            };
        }
        Err(RconError::Protocol("no auth response from console".into()))
    }

    fn session(&self, stream: &mut TcpStream, command: &str) -> Result<String, RconError> {
        self.login(stream)?;

        let request = Packet::new(COMMAND_REQUEST_ID, PACKET_COMMAND, command.as_bytes());
        write_packet(stream, &request).map_err(|e| RconError::from_io(e, self.timeout))?;

        let reply = read_packet(stream).map_err(|e| RconError::from_io(e, self.timeout))?;
        if reply.request_id != COMMAND_REQUEST_ID {
            return Err(RconError::Protocol(format!(
                "response for unknown request id {}",
                reply.request_id
            )));
        }
        Ok(reply.body_text())
    }
}

impl Default for RconExecutor {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_RCON_PORT)
    }
}

impl ConsoleCommandRunner for RconExecutor {
    fn run(&self, command: &str) -> Result<String, RconError> {
        if command.len() > MAX_COMMAND_BYTES {
            return Err(RconError::CommandTooLong {
                len: command.len(),
                max: MAX_COMMAND_BYTES,
            });
        }

        let mut stream = self.connect()?;
        tracing::debug!(addr = %self.addr(), command, "console command");
        let result = self.session(&mut stream, command);
        // Closed on every path; the server does not expect us to linger.
        let _ = stream.shutdown(Shutdown::Both);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PACKET_RESPONSE_VALUE;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Minimal in-process console: answers one login and one command.
    fn fake_console(
        password: &'static str,
        reply: &'static str,
    ) -> (RconExecutor, JoinHandle<Option<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let login = read_packet(&mut stream).expect("login");
            assert_eq!(login.kind, PACKET_LOGIN);
            if login.body != password.as_bytes() {
                let rejected = Packet::new(AUTH_REJECTED_ID, PACKET_AUTH_RESPONSE, "");
                write_packet(&mut stream, &rejected).expect("write");
                return None;
            }
            let empty = Packet::new(login.request_id, PACKET_RESPONSE_VALUE, "");
            write_packet(&mut stream, &empty).expect("write");
            let ok = Packet::new(login.request_id, PACKET_AUTH_RESPONSE, "");
            write_packet(&mut stream, &ok).expect("write");

            let command = read_packet(&mut stream).expect("command");
            assert_eq!(command.kind, PACKET_COMMAND);
            let response = Packet::new(command.request_id, PACKET_RESPONSE_VALUE, reply);
            write_packet(&mut stream, &response).expect("write");
            Some(command.body_text())
        });
        let executor = RconExecutor::new("127.0.0.1", port)
            .with_password(password)
            .with_timeout(Duration::from_secs(2));
        (executor, handle)
    }

    #[test]
    fn default_executor() {
        let exec = RconExecutor::default();
        assert_eq!(exec.addr(), "127.0.0.1:25575");
        assert!(exec.password.is_empty());
        assert_eq!(exec.timeout, DEFAULT_RCON_TIMEOUT);
    }

    #[test]
    fn runs_command_against_console() {
        let (exec, server) = fake_console("secret", "There are 0 of a max 20 players online:");
        let response = exec.run("list").expect("command should succeed");
        assert_eq!(response, "There are 0 of a max 20 players online:");
        assert_eq!(server.join().expect("server"), Some("list".to_string()));
    }

    #[test]
    fn wrong_password_is_auth_failure() {
        let (exec, server) = fake_console("secret", "unused");
        let exec = exec.with_password("guess");
        let err = exec.run("list").expect_err("auth should fail");
        assert!(matches!(err, RconError::AuthFailed), "got {err:?}");
        assert_eq!(server.join().expect("server"), None);
    }

    #[test]
    fn closed_port_is_connect_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let exec = RconExecutor::new("127.0.0.1", port).with_timeout(Duration::from_secs(1));
        let err = exec.run("list").expect_err("nothing listening");
        assert!(matches!(err, RconError::ConnectFailed { .. }), "got {err:?}");
    }

    #[test]
    fn silent_console_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            thread::sleep(Duration::from_millis(600));
            drop(stream);
        });
        let exec = RconExecutor::new("127.0.0.1", port).with_timeout(Duration::from_millis(200));
        let err = exec.run("list").expect_err("should time out");
        assert!(matches!(err, RconError::Timeout(_)), "got {err:?}");
        server.join().expect("server");
    }

    #[test]
    fn oversized_command_rejected_before_connecting() {
        let exec = RconExecutor::new("127.0.0.1", 1);
        let command = format!("say {}", "x".repeat(MAX_COMMAND_BYTES));
        let err = exec.run(&command).expect_err("too long");
        assert!(matches!(err, RconError::CommandTooLong { .. }), "got {err:?}");
    }

    #[test]
    fn blanket_ref_impl() {
        struct Mock;
        impl ConsoleCommandRunner for Mock {
            fn run(&self, _command: &str) -> Result<String, RconError> {
                Ok("ok".to_string())
            }
        }
        let mock = Mock;
        let r: &Mock = &mock;
        assert_eq!(r.run("list").expect("ok"), "ok");
    }
}
