//! Connection settings for the search engine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How to reach the search engine.
///
/// Only the scheme, host and port of [`SearchSettings::url`] are used.
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_socket_timeout_ms")]
    pub socket_timeout_ms: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub pool: ConnectionPoolSettings,
}

impl SearchSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    /// Basic-auth credentials, present only when a username is set and a
    /// password is given.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match &self.password {
            Some(password) if !self.username.is_empty() => {
                Some((self.username.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            socket_timeout_ms: default_socket_timeout_ms(),
            username: String::new(),
            password: None,
            pool: ConnectionPoolSettings::default(),
        }
    }
}

impl fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSettings")
            .field("url", &self.url)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("socket_timeout_ms", &self.socket_timeout_ms)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pool", &self.pool)
            .finish()
    }
}

/// Connection pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPoolSettings {
    /// Upper bound on requests in flight across all hosts.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Idle connections kept per host.
    #[serde(default = "default_max_connections_per_route")]
    pub max_connections_per_route: usize,
}

impl Default for ConnectionPoolSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_connections_per_route: default_max_connections_per_route(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_socket_timeout_ms() -> u64 {
    60_000
}

fn default_max_connections() -> usize {
    100
}

fn default_max_connections_per_route() -> usize {
    10
}
