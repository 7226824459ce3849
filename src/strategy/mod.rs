//! Response strategies, one per wire mode.
//!
//! # Data Flow
//! ```text
//! callback.rs: decode_json → verifier → 200 {"outcome": ...}
//! proxy.rs:    decode_form → verifier → 403 | POST /~session → 204 + Set-Cookie
//! ```
//!
//! # Design Decisions
//! - The strategies are independent handlers with their own state; they
//!   share only the body reader and the error table in `http`
//! - Each handler writes exactly one response: success or the mapped error

pub mod callback;
pub mod proxy;

pub use callback::CallbackState;
pub use proxy::ProxyState;
