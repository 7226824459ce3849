//! Identity data and the verification delegate.
//!
//! # Data Flow
//! ```text
//! LoginData (decoded from the request)
//!     → verifier.rs (embedder-supplied credential check)
//!     → LoginOutcome (Forbidden | Authenticated(UserInfo))
//!     → handed to the active response strategy
//! ```
//!
//! # Design Decisions
//! - The bridge never inspects credentials itself; the verifier is the only
//!   trust boundary
//! - `LoginData` lives for one request and never reaches a log line

pub mod dummy;
pub mod types;
pub mod verifier;

pub use dummy::DummyVerifier;
pub use types::{LoginData, LoginOutcome, UserInfo};
pub use verifier::{verifier_fn, FnVerifier, Verifier};
