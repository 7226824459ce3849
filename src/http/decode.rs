//! Wire decoders for both login modes.
//!
//! Both decoders validate in the same order and fail on the first problem:
//! method, content type, body download, body parse, fields.

use axum::{
    body::Body,
    http::{header, request::Parts, Method, Request},
};
use serde_json::Value;
use url::form_urlencoded;

use crate::auth::LoginData;
use crate::http::{body::read_body, BridgeError};

const USERID_FIELD: &str = "userid";
const PASSWORD_FIELD: &str = "password";

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decodes a callback mode request (`POST`, JSON object body).
pub async fn decode_json(request: Request<Body>, limit: usize) -> Result<LoginData, BridgeError> {
    let (parts, body) = request.into_parts();
    check_head(&parts, JSON_CONTENT_TYPE)?;
    let body = read_body(body, limit).await?;
    parse_json(&body)
}

/// Decodes a proxy mode request (`POST`, form-encoded body).
pub async fn decode_form(request: Request<Body>, limit: usize) -> Result<LoginData, BridgeError> {
    let (parts, body) = request.into_parts();
    check_head(&parts, FORM_CONTENT_TYPE)?;
    let body = read_body(body, limit).await?;
    parse_form(&body)
}

fn check_head(parts: &Parts, content_type: &str) -> Result<(), BridgeError> {
    if parts.method != Method::POST {
        return Err(BridgeError::MethodNotAllowed);
    }

    let correct_content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(content_type.as_bytes()));
    if !correct_content_type {
        return Err(BridgeError::IncorrectContentType);
    }

    Ok(())
}

/// Extracts `userid` and `password` from a JSON object.
///
/// Absent and `null` fields count as missing. Present values must be
/// strings; they are taken over unchanged.
pub fn parse_json(body: &str) -> Result<LoginData, BridgeError> {
    let value: Value = serde_json::from_str(body).map_err(|_| BridgeError::InvalidJson)?;

    let field = |name: &str| value.get(name).filter(|v| !v.is_null());
    let (Some(userid), Some(password)) = (field(USERID_FIELD), field(PASSWORD_FIELD)) else {
        return Err(BridgeError::MissingFields);
    };
    let (Some(userid), Some(password)) = (userid.as_str(), password.as_str()) else {
        return Err(BridgeError::InvalidFieldTypes);
    };

    Ok(LoginData::new(userid, password))
}

/// Extracts `userid` and `password` from form data. Each has to occur
/// exactly once; other fields are ignored.
pub fn parse_form(body: &str) -> Result<LoginData, BridgeError> {
    let mut userids = Vec::new();
    let mut passwords = Vec::new();
    for (key, value) in form_urlencoded::parse(body.as_bytes()) {
        match key.as_ref() {
            USERID_FIELD => userids.push(value.into_owned()),
            PASSWORD_FIELD => passwords.push(value.into_owned()),
            _ => {}
        }
    }

    Ok(LoginData {
        userid: exactly_once(userids, USERID_FIELD)?,
        password: exactly_once(passwords, PASSWORD_FIELD)?,
    })
}

fn exactly_once(values: Vec<String>, name: &'static str) -> Result<String, BridgeError> {
    let [value]: [String; 1] = values
        .try_into()
        .map_err(|_| BridgeError::FieldNotExactlyOnce(name))?;
    Ok(value)
}
