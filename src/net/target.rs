//! Addresses the bridge listens on or connects to.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// A TCP host/port pair or a Unix domain socket path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenTarget {
    Tcp { host: String, port: u16 },
    Unix { socket_path: PathBuf },
}

impl ListenTarget {
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp { host: host.into(), port }
    }

    pub fn unix(socket_path: impl Into<PathBuf>) -> Self {
        Self::Unix { socket_path: socket_path.into() }
    }

    /// `host:port` as used in an HTTP authority. IPv6 literals get brackets.
    pub(crate) fn authority(host: &str, port: u16) -> String {
        if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        }
    }
}

impl fmt::Display for ListenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(f, "http://{}", Self::authority(host, *port)),
            Self::Unix { socket_path } => write!(f, "unix://{}", socket_path.display()),
        }
    }
}

/// The address a listener actually bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAddress {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

impl fmt::Display for BoundAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "http://{addr}"),
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}
