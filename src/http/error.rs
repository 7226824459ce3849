//! Error classification and the status mapping table.
//!
//! Every stage of the request pipeline fails with a [`BridgeError`]. The
//! table in [`BridgeError::response`] is the only place where a
//! classification turns into a status code and body, so both strategies
//! answer identical failures identically.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::borrow::Cow;
use thiserror::Error;

/// Classified failure of a login request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("incorrect content type")]
    IncorrectContentType,

    #[error("request body is not valid UTF-8")]
    InvalidUtf8,

    #[error("request body is not valid JSON")]
    InvalidJson,

    #[error("request body lacks userid or password")]
    MissingFields,

    #[error("userid or password is not a string")]
    InvalidFieldTypes,

    #[error("field {0} not present exactly once")]
    FieldNotExactlyOnce(&'static str),

    #[error("request body exceeds the size limit")]
    BodyTooLarge,

    /// The verifier returned an error or panicked.
    #[error("login check failed")]
    Verifier,

    #[error("host session service unreachable")]
    SessionUnreachable,

    #[error("host session service timed out")]
    SessionTimeout,

    /// Anything not classified above. The message is only logged.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Maps this error to the response written to the client.
    pub fn response(&self) -> ErrorResponse {
        match self {
            Self::MethodNotAllowed => ErrorResponse::empty(StatusCode::METHOD_NOT_ALLOWED),
            Self::IncorrectContentType => ErrorResponse::bad_request("incorrect content type"),
            Self::InvalidUtf8 => ErrorResponse::bad_request("Request body is not valid UTF-8"),
            Self::InvalidJson => ErrorResponse::bad_request("Invalid JSON request body"),
            Self::MissingFields => ErrorResponse::bad_request("Missing fields in body"),
            Self::InvalidFieldTypes => ErrorResponse::bad_request("Invalid field types in body"),
            Self::FieldNotExactlyOnce(name) => {
                ErrorResponse::bad_request(format!("field {name} not present exactly once"))
            }
            Self::BodyTooLarge => {
                ErrorResponse::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            }
            Self::Verifier => ErrorResponse::empty(StatusCode::INTERNAL_SERVER_ERROR),
            Self::SessionUnreachable => ErrorResponse::empty(StatusCode::BAD_GATEWAY),
            Self::SessionTimeout => ErrorResponse::empty(StatusCode::GATEWAY_TIMEOUT),
            Self::Internal(_) => ErrorResponse::internal(),
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        if let Self::Internal(msg) = &self {
            tracing::error!(error = %msg, "Unclassified error while handling login request");
        }
        self.response().into_response()
    }
}

/// Status code and optional plain-text body of a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: StatusCode,
    pub body: Option<Cow<'static, str>>,
}

impl ErrorResponse {
    pub fn new(code: StatusCode, body: impl Into<Cow<'static, str>>) -> Self {
        Self { code, body: Some(body.into()) }
    }

    pub fn empty(code: StatusCode) -> Self {
        Self { code, body: None }
    }

    pub fn bad_request(body: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    /// The catch-all `500` used for unclassified failures.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (
                self.code,
                [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
                body.into_owned(),
            )
                .into_response(),
            None => self.code.into_response(),
        }
    }
}
