//! Client for the host session service.
//!
//! # Responsibilities
//! - Encode a user's identity into base64 request headers
//! - Send `POST /~session` over TCP or a Unix socket, exactly once
//! - Hand back the status and the `Set-Cookie` values, nothing else
//!
//! # Design Decisions
//! - No retries: a login is a single non-idempotent attempt
//! - The downstream error never reaches the client, only the logs
//! - Every header value is base64 so arbitrary UTF-8 survives transport

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioIo},
};
use std::path::Path;
use std::time::Duration;
use tokio::net::UnixStream;
use tower::BoxError;

use crate::auth::UserInfo;
use crate::config::{validation::parse_header_name, ConfigError, SessionConfig, ValidationError};
use crate::http::BridgeError;
use crate::net::ListenTarget;

/// Path of the session endpoint on the host.
pub const SESSION_PATH: &str = "/~session";

/// Names of the identity headers sent to the host.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub username: HeaderName,
    pub display_name: HeaderName,
    pub roles: HeaderName,
    pub email: HeaderName,
}

impl IdentityHeaders {
    fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        let parse = |field, value: &str| {
            parse_header_name(field, value).map_err(|e| ConfigError::Validation(vec![e]))
        };
        Ok(Self {
            username: parse("session.username_header", &config.username_header)?,
            display_name: parse("session.display_name_header", &config.display_name_header)?,
            roles: parse("session.roles_header", &config.roles_header)?,
            email: parse("session.email_header", &config.email_header)?,
        })
    }
}

/// What the host answered to a session request.
#[derive(Debug, Clone)]
pub struct SessionReply {
    pub status: StatusCode,
    pub cookies: Vec<HeaderValue>,
}

/// Client for `POST /~session` on the host session service.
#[derive(Debug, Clone)]
pub struct SessionClient {
    target: ListenTarget,
    uri: Uri,
    headers: IdentityHeaders,
    timeout: Duration,
    client: Client<HttpConnector, Body>,
}

impl SessionClient {
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        let target = config.target();
        let uri = match &target {
            ListenTarget::Tcp { host, port } => {
                format!("http://{}{SESSION_PATH}", ListenTarget::authority(host, *port))
            }
            ListenTarget::Unix { .. } => SESSION_PATH.to_string(),
        };
        let uri = uri.parse::<Uri>().map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidHost {
                section: "session",
                host: target.to_string(),
            }])
        })?;

        Ok(Self {
            target,
            uri,
            headers: IdentityHeaders::from_config(config)?,
            timeout: config.timeout(),
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        })
    }

    pub fn target(&self) -> &ListenTarget {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Same client with a different session request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the session request for `info`.
    pub fn build_request(&self, info: &UserInfo) -> Result<Request<Body>, BridgeError> {
        let roles = info.transmitted_roles().join(",");

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header(&self.headers.username, encode(&info.username)?)
            .header(&self.headers.display_name, encode(&info.display_name)?)
            .header(&self.headers.roles, encode(&roles)?);
        if let Some(email) = &info.email {
            builder = builder.header(&self.headers.email, encode(email)?);
        }
        if matches!(self.target, ListenTarget::Unix { .. }) {
            builder = builder.header(header::HOST, "localhost");
        }

        builder
            .body(Body::empty())
            .map_err(|e| BridgeError::Internal(format!("failed to build session request: {e}")))
    }

    /// Asks the host to create a session for `info`.
    pub async fn create_session(&self, info: &UserInfo) -> Result<SessionReply, BridgeError> {
        let request = self.build_request(info)?;

        let response = match tokio::time::timeout(self.timeout, self.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(
                    target_addr = %self.target,
                    error = %e,
                    "Could not reach host session service"
                );
                return Err(BridgeError::SessionUnreachable);
            }
            Err(_) => {
                tracing::error!(
                    target_addr = %self.target,
                    timeout = ?self.timeout,
                    "Host session service did not answer in time"
                );
                return Err(BridgeError::SessionTimeout);
            }
        };

        Ok(SessionReply {
            status: response.status(),
            cookies: response.headers().get_all(header::SET_COOKIE).iter().cloned().collect(),
        })
    }

    async fn send(&self, request: Request<Body>) -> Result<Response<Incoming>, BoxError> {
        match &self.target {
            ListenTarget::Tcp { .. } => Ok(self.client.request(request).await?),
            ListenTarget::Unix { socket_path } => send_unix(socket_path, request).await,
        }
    }
}

async fn send_unix(path: &Path, request: Request<Body>) -> Result<Response<Incoming>, BoxError> {
    let stream = UnixStream::connect(path).await?;
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(error = %e, "Session socket connection ended with error");
        }
    });
    Ok(sender.send_request(request).await?)
}

fn encode(value: &str) -> Result<HeaderValue, BridgeError> {
    HeaderValue::try_from(STANDARD.encode(value))
        .map_err(|e| BridgeError::Internal(format!("invalid identity header value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> UserInfo {
        UserInfo {
            username: "bob".into(),
            display_name: "Bøb \r\n Smith".into(),
            roles: vec!["ROLE_USER".into(), "ROLE_USER".into()],
            user_role: "ROLE_BOB".into(),
            email: None,
            user_realm_handle: Some("bobby".into()),
        }
    }

    fn decode(value: &HeaderValue) -> String {
        String::from_utf8(STANDARD.decode(value.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn request_carries_encoded_identity() {
        let client = SessionClient::new(&SessionConfig::default()).unwrap();
        let request = client.build_request(&info()).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri(), "http://localhost:3080/~session");

        let headers = request.headers();
        assert_eq!(decode(&headers["x-tobira-username"]), "bob");
        assert_eq!(decode(&headers["x-tobira-user-display-name"]), "Bøb \r\n Smith");
        assert_eq!(decode(&headers["x-tobira-user-roles"]), "ROLE_USER,ROLE_USER,ROLE_BOB");
        assert!(headers.get("x-tobira-user-email").is_none());
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn email_and_custom_header_names() {
        let config = SessionConfig {
            email_header: "X-Mail".into(),
            ..SessionConfig::default()
        };
        let client = SessionClient::new(&config).unwrap();
        let mut user = info();
        user.email = Some("bob@example.org".into());

        let request = client.build_request(&user).unwrap();
        assert_eq!(decode(&request.headers()["x-mail"]), "bob@example.org");
    }

    #[test]
    fn unix_target_uses_relative_uri_and_host_header() {
        let config = SessionConfig {
            socket_path: Some("/run/tobira.sock".into()),
            ..SessionConfig::default()
        };
        let client = SessionClient::new(&config).unwrap();
        let request = client.build_request(&info()).unwrap();
        assert_eq!(request.uri(), SESSION_PATH);
        assert_eq!(request.headers()[header::HOST], "localhost");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let config = SessionConfig {
            host: Some("tobira internal".into()),
            ..SessionConfig::default()
        };
        assert!(matches!(SessionClient::new(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let config = SessionConfig {
            username_header: "bad header".into(),
            ..SessionConfig::default()
        };
        assert!(matches!(SessionClient::new(&config), Err(ConfigError::Validation(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_classified() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SessionConfig {
            host: Some("127.0.0.1".into()),
            port: Some(port),
            ..SessionConfig::default()
        };
        let client = SessionClient::new(&config).unwrap();
        let result = client.create_session(&info()).await;
        assert!(matches!(result, Err(BridgeError::SessionUnreachable)));
    }

    #[tokio::test]
    async fn missing_socket_is_unreachable() {
        let config = SessionConfig {
            socket_path: Some("/nonexistent/auth-bridge/tobira.sock".into()),
            ..SessionConfig::default()
        };
        let client = SessionClient::new(&config).unwrap();
        let result = client.create_session(&info()).await;
        assert!(matches!(result, Err(BridgeError::SessionUnreachable)));
    }

    #[tokio::test]
    async fn silent_host_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _hold = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                open.push(stream);
            }
        });

        let config = SessionConfig {
            host: Some("127.0.0.1".into()),
            port: Some(port),
            timeout_secs: 1,
            ..SessionConfig::default()
        };
        let client = SessionClient::new(&config).unwrap();
        let result = client.create_session(&info()).await;
        assert!(matches!(result, Err(BridgeError::SessionTimeout)));
    }
}
