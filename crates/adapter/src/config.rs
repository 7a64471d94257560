//! Client configuration from environment variables.

use std::time::Duration;

use duel_tetris_core::SessionConfig;
use url::Url;

use crate::types::{COMMAND_COOLDOWN_MS, PENDING_IDLE_MS, RECONNECT_DELAY_MS};

pub const DEFAULT_SERVER: &str = "localhost:8080";

/// Where the server lives and how the client is tuned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host[:port]`, no scheme. The client speaks plain `ws`/`http` only.
    pub server: String,
    pub reconnect_delay: Duration,
    pub cooldown: Duration,
    pub idle_expiry: Duration,
    pub log_path: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            reconnect_delay: Duration::from_millis(RECONNECT_DELAY_MS),
            cooldown: Duration::from_millis(COMMAND_COOLDOWN_MS),
            idle_expiry: Duration::from_millis(PENDING_IDLE_MS),
            log_path: None,
        }
    }
}

impl ClientConfig {
    /// Create from `DUEL_TETRIS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let millis = |key: &str, fallback: Duration| {
            non_empty(key)
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        Self {
            server: non_empty("DUEL_TETRIS_SERVER")
                .map(|s| normalize_server(&s))
                .unwrap_or(defaults.server),
            reconnect_delay: millis("DUEL_TETRIS_RECONNECT_MS", defaults.reconnect_delay),
            cooldown: millis("DUEL_TETRIS_COOLDOWN_MS", defaults.cooldown),
            idle_expiry: millis("DUEL_TETRIS_IDLE_MS", defaults.idle_expiry),
            log_path: non_empty("DUEL_TETRIS_LOG_PATH"),
        }
    }

    pub fn with_server(mut self, server: &str) -> Self {
        self.server = normalize_server(server);
        self
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            cooldown: self.cooldown,
            idle_expiry: self.idle_expiry,
        }
    }

    /// `ws://<server>/ws?roomID=..&playerID=..`
    pub fn ws_url(&self, room_id: &str, player_id: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("ws://{}/ws", self.server))?;
        url.query_pairs_mut()
            .append_pair("roomID", room_id)
            .append_pair("playerID", player_id);
        Ok(url)
    }

    /// `http://<server>/<path>` with optional query pairs.
    pub fn http_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("http://{}", self.server))?.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

/// Strip any scheme and trailing slash a user may have typed.
fn normalize_server(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    without_scheme.trim_end_matches('/').to_string()
}
