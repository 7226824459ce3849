//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject ambiguous listen targets (socket path and host/port)
//! - Validate value ranges (timeouts > 0, ports, file modes)
//! - Check that configured header names are valid
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderName;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::schema::{BridgeConfig, Mode};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{section}: socket_path cannot be combined with host or port")]
    ConflictingTarget { section: &'static str },

    #[error("{section}.host must not be empty")]
    EmptyHost { section: &'static str },

    #[error("{section}.host '{host}' is not a valid host name")]
    InvalidHost { section: &'static str, host: String },

    #[error("session.port must not be 0")]
    ZeroSessionPort,

    #[error("{field} must be greater than 0")]
    Zero { field: &'static str },

    #[error("listener.socket_permissions {0:#o} is not a valid file mode")]
    InvalidPermissions(u32),

    #[error("{field}: invalid header name '{value}'")]
    InvalidHeaderName { field: &'static str, value: String },

    #[error(
        "session.timeout_secs ({session}) must be below listener.request_timeout_secs ({request})"
    )]
    SessionTimeoutNotBelowRequestTimeout { session: u64, request: u64 },
}

/// Check the whole configuration, collecting every problem found.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listener = &config.listener;
    check_target(&mut errors, "listener", &listener.host, listener.port, &listener.socket_path);
    if listener.socket_permissions > 0o777 {
        errors.push(ValidationError::InvalidPermissions(listener.socket_permissions));
    }
    if listener.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_body_size" });
    }
    if listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "listener.request_timeout_secs" });
    }

    let session = &config.session;
    check_target(&mut errors, "session", &session.host, session.port, &session.socket_path);
    if session.port == Some(0) {
        errors.push(ValidationError::ZeroSessionPort);
    }
    if session.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "session.timeout_secs" });
    }
    // The request timeout must not preempt the 504 for a silent host.
    if config.mode == Mode::Proxy
        && listener.request_timeout_secs > 0
        && session.timeout_secs >= listener.request_timeout_secs
    {
        errors.push(ValidationError::SessionTimeoutNotBelowRequestTimeout {
            session: session.timeout_secs,
            request: listener.request_timeout_secs,
        });
    }
    for (field, value) in [
        ("session.username_header", &session.username_header),
        ("session.display_name_header", &session.display_name_header),
        ("session.roles_header", &session.roles_header),
        ("session.email_header", &session.email_header),
    ] {
        if let Err(e) = parse_header_name(field, value) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_target(
    errors: &mut Vec<ValidationError>,
    section: &'static str,
    host: &Option<String>,
    port: Option<u16>,
    socket_path: &Option<PathBuf>,
) {
    if socket_path.is_some() && (host.is_some() || port.is_some()) {
        errors.push(ValidationError::ConflictingTarget { section });
    }
    if host.as_deref().is_some_and(|h| h.trim().is_empty()) {
        errors.push(ValidationError::EmptyHost { section });
    }
}

/// Parses a configured header name.
pub(crate) fn parse_header_name(
    field: &'static str,
    value: &str,
) -> Result<HeaderName, ValidationError> {
    HeaderName::from_bytes(value.as_bytes()).map_err(|_| ValidationError::InvalidHeaderName {
        field,
        value: value.to_string(),
    })
}
