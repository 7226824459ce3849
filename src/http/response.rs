//! Success responses shared by the strategies.
//!
//! # Design Decisions
//! - Proxy replies carry exactly the relayed `Set-Cookie` headers and no
//!   other header from the host session service
//! - Failure responses live in `error.rs`

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// `200 OK` with a JSON body.
pub fn json_ok<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

/// `403 Forbidden` with an empty body.
pub fn forbidden() -> Response {
    StatusCode::FORBIDDEN.into_response()
}

/// `204 No Content` carrying the given `Set-Cookie` values verbatim.
pub fn session_created(cookies: impl IntoIterator<Item = HeaderValue>) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    for cookie in cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_created_keeps_every_cookie() {
        let response = session_created([
            HeaderValue::from_static("sid=xyz; Path=/; HttpOnly"),
            HeaderValue::from_static("theme=dark"),
        ]);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies, ["sid=xyz; Path=/; HttpOnly", "theme=dark"]);
        assert_eq!(response.headers().len(), 2);
    }

    #[test]
    fn forbidden_is_empty() {
        let response = forbidden();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
