//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenTarget (TCP host:port | Unix socket path)
//!     → listener.rs (bind, stale socket cleanup, permissions)
//!     → BoundAddress reported to the ready callback
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TCP and Unix sockets are mutually exclusive per target
//! - The same target type describes the host session service

pub mod listener;
pub mod target;

pub use listener::{Listener, ListenerError};
pub use target::{BoundAddress, ListenTarget};
