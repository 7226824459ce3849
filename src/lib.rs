//! Auth bridge: a small HTTP service that sits between a login form and a
//! host application's session system.
//!
//! A login request carries a user ID and a password. An embedder-supplied
//! [`Verifier`] decides whether they are valid. The bridge then answers in
//! one of two wire modes:
//!
//! - **callback**: JSON in, `{"outcome": "no-user" | "user", ...}` out
//! - **proxy**: form data in, `POST /~session` on the host session service,
//!   only its `Set-Cookie` headers relayed back
//!
//! # Architecture Overview
//!
//! ```text
//!   Login request ──▶ net (TCP | Unix) ──▶ http::server (middleware)
//!                                              │
//!                                   ┌──────────┴──────────┐
//!                                   ▼                     ▼
//!                          strategy::callback      strategy::proxy
//!                          decode_json             decode_form
//!                                   │                     │
//!                                   └────▶ Verifier ◀─────┘
//!                                              │
//!                                   JSON outcome   session::SessionClient
//!                                                  (base64 identity headers)
//! ```

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod session;
pub mod strategy;

pub use auth::{verifier_fn, DummyVerifier, LoginData, LoginOutcome, UserInfo, Verifier};
pub use config::{BridgeConfig, Mode};
pub use http::{BoundServer, BridgeServer, ServerError};
pub use lifecycle::Shutdown;
pub use net::{BoundAddress, ListenTarget};
pub use session::SessionClient;
