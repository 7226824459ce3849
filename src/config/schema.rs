//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::net::ListenTarget;

/// Default address the bridge listens on.
pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";
pub const DEFAULT_LISTEN_PORT: u16 = 3091;

/// Default location of the host session service.
pub const DEFAULT_SESSION_HOST: &str = "localhost";
pub const DEFAULT_SESSION_PORT: u16 = 3080;

/// Root configuration for the auth bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Wire mode of the bridge.
    pub mode: Mode,

    /// Where and how to accept login requests.
    pub listener: ListenerConfig,

    /// Host session service (proxy mode only).
    pub session: SessionConfig,

    pub logging: LoggingConfig,
}

/// Wire mode: which decoder and response strategy handle requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// JSON in, JSON outcome out.
    #[default]
    Callback,
    /// Form data in, session cookie from the host session service out.
    Proxy,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// TCP host. Defaults to `127.0.0.1` unless `socket_path` is set.
    pub host: Option<String>,

    /// TCP port. Defaults to 3091 unless `socket_path` is set.
    pub port: Option<u16>,

    /// Unix domain socket to listen on instead of TCP.
    pub socket_path: Option<PathBuf>,

    /// File permissions of the Unix socket.
    pub socket_permissions: u32,

    /// Maximum accepted request body size in bytes.
    pub max_body_size: usize,

    /// Total time a single request may take, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            socket_path: None,
            socket_permissions: 0o755,
            max_body_size: 16 * 1024,
            request_timeout_secs: 30,
        }
    }
}

impl ListenerConfig {
    /// The target to bind. A socket path wins over host/port; validation
    /// rejects configs that set both.
    pub fn target(&self) -> ListenTarget {
        resolve_target(
            &self.host,
            self.port,
            &self.socket_path,
            DEFAULT_LISTEN_HOST,
            DEFAULT_LISTEN_PORT,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Host session service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Defaults to `localhost` unless `socket_path` is set.
    pub host: Option<String>,

    /// Defaults to 3080 unless `socket_path` is set.
    pub port: Option<u16>,

    /// Reach the host session service over this Unix socket instead of TCP.
    pub socket_path: Option<PathBuf>,

    /// Timeout for the session request in seconds.
    pub timeout_secs: u64,

    /// The header containing the unique and stable username.
    pub username_header: String,

    /// The header containing the human-readable name.
    pub display_name_header: String,

    /// The header containing the comma-separated roles.
    pub roles_header: String,

    /// The header containing the email address, if the user has one.
    pub email_header: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            socket_path: None,
            timeout_secs: 10,
            username_header: "x-tobira-username".to_string(),
            display_name_header: "x-tobira-user-display-name".to_string(),
            roles_header: "x-tobira-user-roles".to_string(),
            email_header: "x-tobira-user-email".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn target(&self) -> ListenTarget {
        resolve_target(
            &self.host,
            self.port,
            &self.socket_path,
            DEFAULT_SESSION_HOST,
            DEFAULT_SESSION_PORT,
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn resolve_target(
    host: &Option<String>,
    port: Option<u16>,
    socket_path: &Option<PathBuf>,
    default_host: &str,
    default_port: u16,
) -> ListenTarget {
    match socket_path {
        Some(path) => ListenTarget::Unix { socket_path: path.clone() },
        None => ListenTarget::Tcp {
            host: host.clone().unwrap_or_else(|| default_host.to_string()),
            port: port.unwrap_or(default_port),
        },
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error or a full
    /// `tracing` filter). `RUST_LOG` takes precedence.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
