//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems emit tracing events and spans:
//!     → http::request (one span per login request, carrying the request ID)
//!     → logging.rs (subscriber: env filter + pretty or JSON formatter)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is left to the
//!   binary or the embedder
//! - Passwords and verifier error details never appear in client responses,
//!   only in logs (and passwords not even there)

pub mod logging;

pub use logging::{init, subscriber, LoggingError};
