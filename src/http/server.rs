//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum Router for the configured strategy
//! - Wire up middleware (tracing, request ID, timeout, panic catching)
//! - Bind to the listen target and report readiness
//! - Serve until the shutdown future resolves
//!
//! # Lifecycle
//! ```text
//! BridgeServer (Created) → bind() → BoundServer (Listening) → serve() → Closed
//! ```

use axum::{
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::Verifier;
use crate::config::{validate_config, BridgeConfig, ConfigError, ListenerConfig, Mode};
use crate::http::{request, ErrorResponse};
use crate::net::{BoundAddress, ListenTarget, Listener, ListenerError};
use crate::session::SessionClient;
use crate::strategy::{callback, proxy, CallbackState, ProxyState};

/// Called once the listener is bound.
pub type ReadyCallback = Box<dyn FnOnce(&BoundAddress) + Send>;

/// Errors that end the server as a whole.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    /// The bound listener could not report its address, or the serve loop
    /// failed. `axum::serve` retries failed accepts itself, so once serving
    /// has started this is not expected in practice.
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

#[derive(Clone)]
enum Strategy {
    Callback,
    Proxy(Arc<SessionClient>),
}

impl Strategy {
    fn label(&self) -> &'static str {
        match self {
            Self::Callback => "callback",
            Self::Proxy(_) => "proxy",
        }
    }
}

/// The auth bridge server, before binding.
pub struct BridgeServer {
    target: ListenTarget,
    strategy: Strategy,
    verifier: Arc<dyn Verifier>,
    max_body_size: usize,
    request_timeout: Duration,
    socket_permissions: u32,
    on_ready: Option<ReadyCallback>,
}

impl BridgeServer {
    /// A server answering login requests with JSON outcomes.
    pub fn callback(target: ListenTarget, verifier: Arc<dyn Verifier>) -> Self {
        Self::new(target, Strategy::Callback, verifier)
    }

    /// A server creating sessions on the host session service.
    pub fn proxy(target: ListenTarget, session: SessionClient, verifier: Arc<dyn Verifier>) -> Self {
        Self::new(target, Strategy::Proxy(Arc::new(session)), verifier)
    }

    fn new(target: ListenTarget, strategy: Strategy, verifier: Arc<dyn Verifier>) -> Self {
        let defaults = ListenerConfig::default();
        Self {
            target,
            strategy,
            verifier,
            max_body_size: defaults.max_body_size,
            request_timeout: defaults.request_timeout(),
            socket_permissions: defaults.socket_permissions,
            on_ready: None,
        }
    }

    /// Build a server from a configuration, validating it first.
    pub fn from_config(config: &BridgeConfig, verifier: Arc<dyn Verifier>) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let target = config.listener.target();
        let server = match config.mode {
            Mode::Callback => Self::callback(target, verifier),
            Mode::Proxy => Self::proxy(target, SessionClient::new(&config.session)?, verifier),
        };

        Ok(server
            .max_body_size(config.listener.max_body_size)
            .request_timeout(config.listener.request_timeout())
            .socket_permissions(config.listener.socket_permissions))
    }

    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn socket_permissions(mut self, mode: u32) -> Self {
        self.socket_permissions = mode;
        self
    }

    /// Replace the default "listening" log line with `callback`.
    pub fn on_ready(mut self, callback: impl FnOnce(&BoundAddress) + Send + 'static) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let router = match &self.strategy {
            Strategy::Callback => Router::new()
                .fallback(callback::handle)
                .with_state(CallbackState {
                    verifier: Arc::clone(&self.verifier),
                    max_body_size: self.max_body_size,
                }),
            Strategy::Proxy(session) => Router::new()
                .fallback(proxy::handle)
                .with_state(ProxyState {
                    verifier: Arc::clone(&self.verifier),
                    session: self.session_within_request_timeout(session),
                    max_body_size: self.max_body_size,
                }),
        };

        router
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http().make_span_with(request::make_request_span))
            .layer(request::propagate_request_id_layer())
            .layer(request::set_request_id_layer())
    }

    /// The session request has to time out before the whole request does,
    /// so a silent host is answered with 504 rather than 408.
    fn session_within_request_timeout(&self, session: &Arc<SessionClient>) -> Arc<SessionClient> {
        if session.timeout() < self.request_timeout {
            return Arc::clone(session);
        }

        let clamped = self.request_timeout * 9 / 10;
        tracing::warn!(
            session_timeout = ?session.timeout(),
            request_timeout = ?self.request_timeout,
            clamped = ?clamped,
            "Session timeout not below request timeout, clamping it"
        );
        Arc::new(session.as_ref().clone().with_timeout(clamped))
    }

    /// Bind the listen target and report readiness.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let router = self.router();
        let listener = Listener::bind(&self.target, self.socket_permissions).await?;
        let address = listener.local_addr().map_err(ServerError::Serve)?;

        match (self.on_ready, &self.strategy) {
            (Some(callback), _) => callback(&address),
            (None, Strategy::Callback) => tracing::info!(
                address = %address,
                mode = self.strategy.label(),
                "Auth bridge listening"
            ),
            (None, Strategy::Proxy(session)) => tracing::info!(
                address = %address,
                mode = self.strategy.label(),
                session = %session.target(),
                "Auth bridge listening"
            ),
        }

        Ok(BoundServer { listener, router, address })
    }

    /// Bind, then serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.bind().await?.serve(shutdown).await
    }
}

/// A server whose listener is bound.
pub struct BoundServer {
    listener: Listener,
    router: Router,
    address: BoundAddress,
}

impl BoundServer {
    pub fn local_addr(&self) -> &BoundAddress {
        &self.address
    }

    /// Serve requests until `shutdown` resolves, then drain open requests.
    ///
    /// Accept errors are logged and retried by axum rather than returned,
    /// so a listener in trouble does not end this future.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self { listener, router, address } = self;
        let result = match listener {
            Listener::Tcp(listener) => {
                axum::serve(listener, router).with_graceful_shutdown(shutdown).await
            }
            Listener::Unix { listener, path } => {
                let result = axum::serve(listener, router).with_graceful_shutdown(shutdown).await;
                if let Err(e) = std::fs::remove_file(&path) {
                    tracing::debug!(path = %path.display(), error = %e, "Could not remove socket file");
                }
                result
            }
        };

        result.map_err(ServerError::Serve)?;
        tracing::info!(address = %address, "Auth bridge stopped");
        Ok(())
    }
}

fn handle_panic(_: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Login request handler panicked");
    ErrorResponse::internal().into_response()
}
