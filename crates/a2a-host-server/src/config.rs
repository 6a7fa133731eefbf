//! Command-line and environment configuration of the `a2a-host` binary.
//!
//! Every flag has an `A2A_*` environment fallback. The binary loads a `.env`
//! file (if present) before parsing.

use a2a_host_core::{SessionKey, DEFAULT_APP_NAME, DEFAULT_SESSION_ID, DEFAULT_USER_ID};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

/// Default maximum request body size (1 MiB).
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Which agent runner backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunnerKind {
    /// Agent runtime reached over HTTP.
    Adk,
    /// In-process runner echoing the user's message.
    Echo,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "a2a-host", version, about = "Chat and streaming façade over a routing agent runtime")]
pub struct HostConfig {
    /// Interface to bind.
    #[arg(long, env = "A2A_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "A2A_PORT", default_value_t = 8083)]
    pub port: u16,

    #[arg(long, env = "A2A_RUNNER", value_enum, default_value_t = RunnerKind::Adk)]
    pub runner: RunnerKind,

    /// Base URL of the agent runtime (adk runner only).
    #[arg(long, env = "A2A_RUNNER_URL", default_value = "http://127.0.0.1:8000")]
    pub runner_url: String,

    #[arg(long, env = "A2A_APP_NAME", default_value = DEFAULT_APP_NAME)]
    pub app_name: String,

    #[arg(long, env = "A2A_USER_ID", default_value = DEFAULT_USER_ID)]
    pub user_id: String,

    #[arg(long, env = "A2A_SESSION_ID", default_value = DEFAULT_SESSION_ID)]
    pub session_id: String,

    /// Connect timeout towards the agent runtime, in seconds.
    #[arg(long, env = "A2A_CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Maximum accepted request body size, in bytes.
    #[arg(long, env = "A2A_BODY_LIMIT_BYTES", default_value_t = DEFAULT_BODY_LIMIT_BYTES)]
    pub body_limit_bytes: usize,
}

impl HostConfig {
    /// The fixed session every request is served from.
    #[must_use]
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(&self.app_name, &self.user_id, &self.session_id)
    }

    /// Address the server binds to, as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        match self.host.parse::<SocketAddr>() {
            Ok(addr) => addr.to_string(),
            Err(_) if self.host.contains(':') => format!("[{}]:{}", self.host, self.port),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HostConfig::parse_from(["a2a-host"]);
        assert_eq!(config.port, 8083);
        assert_eq!(config.runner, RunnerKind::Adk);
        assert_eq!(config.runner_url, "http://127.0.0.1:8000");
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.body_limit_bytes, 1024 * 1024);
        assert_eq!(config.bind_addr(), "0.0.0.0:8083");
        assert_eq!(config.session_key(), SessionKey::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = HostConfig::parse_from([
            "a2a-host",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--runner",
            "echo",
            "--session-id",
            "demo",
        ]);
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.runner, RunnerKind::Echo);
        assert_eq!(config.session_key().session_id, "demo");
        assert_eq!(config.session_key().app_name, DEFAULT_APP_NAME);
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let config = HostConfig::parse_from(["a2a-host", "--host", "::1", "--port", "1"]);
        assert_eq!(config.bind_addr(), "[::1]:1");
    }

    #[test]
    fn unknown_runner_is_rejected() {
        assert!(HostConfig::try_parse_from(["a2a-host", "--runner", "magic"]).is_err());
    }
}
