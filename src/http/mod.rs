//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection (net::listener)
//!     → server.rs (Axum setup, middleware, strategy dispatch)
//!     → request.rs (request ID, request span)
//!     → decode.rs (method, content type, body.rs download, field extraction)
//!     → [strategy turns the login outcome into a response]
//!     → response.rs / error.rs (success replies, status mapping)
//!     → Send to client
//! ```

pub mod body;
pub mod decode;
pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::{BridgeError, ErrorResponse};
pub use request::X_REQUEST_ID;
pub use server::{BoundServer, BridgeServer, ServerError};
