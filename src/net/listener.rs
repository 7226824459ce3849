//! TCP and Unix domain socket listeners.
//!
//! # Responsibilities
//! - Bind to the configured target (TCP host:port or socket path)
//! - Replace a stale Unix socket file left behind by a previous run
//! - Apply the configured permissions to the socket file

use std::fs;
use std::io;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};

use crate::net::{BoundAddress, ListenTarget};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {target}: {source}")]
    Bind {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} exists and is not a socket")]
    NotASocket(PathBuf),

    #[error("failed to prepare socket {path}: {source}")]
    Socket {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A bound listener, ready to be served.
#[derive(Debug)]
pub enum Listener {
    Tcp(TcpListener),
    Unix { listener: UnixListener, path: PathBuf },
}

impl Listener {
    /// Bind to `target`. `socket_permissions` only applies to Unix sockets.
    pub async fn bind(target: &ListenTarget, socket_permissions: u32) -> Result<Self, ListenerError> {
        match target {
            ListenTarget::Tcp { host, port } => {
                let listener = TcpListener::bind((host.as_str(), *port))
                    .await
                    .map_err(|source| ListenerError::Bind { target: target.to_string(), source })?;
                Ok(Self::Tcp(listener))
            }
            ListenTarget::Unix { socket_path } => {
                remove_stale_socket(socket_path)?;
                let listener = UnixListener::bind(socket_path)
                    .map_err(|source| ListenerError::Bind { target: target.to_string(), source })?;
                fs::set_permissions(socket_path, fs::Permissions::from_mode(socket_permissions))
                    .map_err(|source| ListenerError::Socket { path: socket_path.clone(), source })?;
                Ok(Self::Unix { listener, path: socket_path.clone() })
            }
        }
    }

    /// Get the address this listener is bound to.
    pub fn local_addr(&self) -> Result<BoundAddress, io::Error> {
        match self {
            Self::Tcp(listener) => listener.local_addr().map(BoundAddress::Tcp),
            Self::Unix { path, .. } => Ok(BoundAddress::Unix(path.clone())),
        }
    }
}

fn remove_stale_socket(path: &Path) -> Result<(), ListenerError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => return Err(ListenerError::Socket { path: path.to_path_buf(), source }),
    };

    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotASocket(path.to_path_buf()));
    }

    tracing::debug!(path = %path.display(), "Removing stale socket file");
    fs::remove_file(path).map_err(|source| ListenerError::Socket { path: path.to_path_buf(), source })
}
