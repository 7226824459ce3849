//! Callback mode: the caller receives the login outcome as JSON.
//!
//! Always answers `200` once a check happened. The caller branches on the
//! `outcome` field, not on the status code.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{verifier, LoginOutcome, UserInfo, Verifier};
use crate::http::{decode::decode_json, response::json_ok, BridgeError};

/// State of the callback handler.
#[derive(Clone)]
pub struct CallbackState {
    pub verifier: Arc<dyn Verifier>,
    pub max_body_size: usize,
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
enum CallbackReply<'a> {
    NoUser,
    User(&'a UserInfo),
}

/// Handles a login request in callback mode.
pub async fn handle(State(state): State<CallbackState>, request: Request<Body>) -> Response {
    match login(&state, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn login(state: &CallbackState, request: Request<Body>) -> Result<Response, BridgeError> {
    let login = decode_json(request, state.max_body_size).await?;
    let outcome = verifier::check(state.verifier.as_ref(), &login).await?;

    let reply = match &outcome {
        LoginOutcome::Forbidden => {
            tracing::debug!("Login rejected");
            CallbackReply::NoUser
        }
        LoginOutcome::Authenticated(info) => {
            tracing::debug!(username = %info.username, "Login accepted");
            CallbackReply::User(info)
        }
    };
    Ok(json_ok(reply))
}
