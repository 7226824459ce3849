//! Shared utilities for integration testing.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, UnixListener};

use auth_bridge::config::SessionConfig;
use auth_bridge::{BoundAddress, BridgeServer, SessionClient, Shutdown};

/// A request received by the mock host session service.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of a base64 identity header, decoded.
    pub fn identity(&self, name: &str) -> Option<String> {
        let raw = self.header(name)?;
        Some(String::from_utf8(STANDARD.decode(raw).unwrap()).unwrap())
    }
}

/// Canned answer of the mock host session service.
#[derive(Debug, Clone)]
pub struct SessionAnswer {
    pub status: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
}

impl SessionAnswer {
    pub fn created(cookies: &[&'static str]) -> Self {
        let mut headers: Vec<_> = cookies.iter().map(|c| ("Set-Cookie", *c)).collect();
        headers.push(("Server", "tobira"));
        headers.push(("X-Internal-Route", "session-backend-3"));
        Self { status: "204 No Content", headers }
    }
}

pub struct MockSession {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockSession {
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock host session service on an ephemeral TCP port.
pub async fn start_session_service(answer: SessionAnswer) -> (SocketAddr, MockSession) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let captured = requests.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(answer_once(socket, answer.clone(), captured.clone()));
        }
    });

    (addr, MockSession { requests })
}

/// Start a mock host session service on a Unix socket.
pub async fn start_unix_session_service(path: &Path, answer: SessionAnswer) -> MockSession {
    let _ = std::fs::remove_file(path);
    let listener = UnixListener::bind(path).unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let captured = requests.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(answer_once(socket, answer.clone(), captured.clone()));
        }
    });

    MockSession { requests }
}

/// Start a host session service that accepts connections and never answers.
pub async fn start_silent_service() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    addr
}

async fn answer_once<S>(mut socket: S, answer: SessionAnswer, captured: Arc<Mutex<Vec<CapturedRequest>>>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();
    captured.lock().unwrap().push(CapturedRequest { method, path, headers });

    let mut response = format!("HTTP/1.1 {}\r\n", answer.status);
    for (name, value) in &answer.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("Content-Length: 0\r\nConnection: close\r\n\r\n");
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// A session client pointing at the mock service on `addr`.
pub fn session_client(addr: SocketAddr) -> SessionClient {
    SessionClient::new(&SessionConfig {
        host: Some(addr.ip().to_string()),
        port: Some(addr.port()),
        ..SessionConfig::default()
    })
    .unwrap()
}

/// Bind `server` and serve it in the background.
pub async fn start_bridge(server: BridgeServer) -> (SocketAddr, Shutdown) {
    let bound = server.bind().await.unwrap();
    let BoundAddress::Tcp(addr) = bound.local_addr().clone() else {
        panic!("expected a TCP listener");
    };

    let shutdown = Shutdown::new();
    let signal = shutdown.signal();
    tokio::spawn(bound.serve(signal));
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn temp_socket(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("auth-bridge-it-{}-{name}", std::process::id()))
}
