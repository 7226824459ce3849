//! Proxy mode: after a successful check, the bridge asks the host session
//! service for a session and relays only its `Set-Cookie` headers.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::{verifier, LoginOutcome, Verifier};
use crate::http::{
    decode::decode_form,
    response::{forbidden, session_created},
    BridgeError,
};
use crate::session::SessionClient;

/// State of the proxy handler.
#[derive(Clone)]
pub struct ProxyState {
    pub verifier: Arc<dyn Verifier>,
    pub session: Arc<SessionClient>,
    pub max_body_size: usize,
}

/// Handles a login request in proxy mode.
pub async fn handle(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    match login(&state, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn login(state: &ProxyState, request: Request<Body>) -> Result<Response, BridgeError> {
    let login = decode_form(request, state.max_body_size).await?;

    let info = match verifier::check(state.verifier.as_ref(), &login).await? {
        LoginOutcome::Forbidden => {
            tracing::debug!("Login rejected");
            return Ok(forbidden());
        }
        LoginOutcome::Authenticated(info) => info,
    };

    tracing::debug!(username = %info.username, "Login accepted, requesting session");
    let reply = state.session.create_session(&info).await?;

    // The session may still have been created, so the cookies are relayed anyway.
    if reply.status != StatusCode::NO_CONTENT {
        tracing::warn!(
            status = %reply.status,
            username = %info.username,
            "Unexpected status from host session service"
        );
    }

    Ok(session_created(reply.cookies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{verifier_fn, DummyVerifier, LoginData};
    use crate::config::SessionConfig;
    use axum::http::{header, Method};
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::{BoxError, ServiceExt};

    fn app(verifier: Arc<dyn Verifier>) -> Router {
        // Discard port, nothing listens there.
        let session = SessionConfig {
            host: Some("127.0.0.1".into()),
            port: Some(9),
            ..SessionConfig::default()
        };
        Router::new().fallback(handle).with_state(ProxyState {
            verifier,
            session: Arc::new(SessionClient::new(&session).unwrap()),
            max_body_size: 1024,
        })
    }

    async fn send(app: Router, method: Method, content_type: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    const FORM: &str = "application/x-www-form-urlencoded";

    #[tokio::test]
    async fn forbidden_is_403_without_body() {
        let (status, body) =
            send(app(Arc::new(DummyVerifier)), Method::POST, FORM, "userid=bob&password=pw").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn wrong_content_type() {
        let (status, body) = send(
            app(Arc::new(DummyVerifier)),
            Method::POST,
            "application/json",
            r#"{"userid":"bob","password":"pw"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "incorrect content type");
    }

    #[tokio::test]
    async fn wrong_method() {
        let (status, body) = send(app(Arc::new(DummyVerifier)), Method::GET, FORM, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn duplicate_userid_never_reaches_verifier() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let verifier = verifier_fn(move |_: LoginData| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, BoxError>(LoginOutcome::Forbidden) }
        });

        let (status, body) = send(
            app(Arc::new(verifier)),
            Method::POST,
            FORM,
            "userid=bob&userid=eve&password=pw",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "field userid not present exactly once");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_host_is_bad_gateway() {
        let (status, body) = send(
            app(Arc::new(DummyVerifier)),
            Method::POST,
            FORM,
            "userid=admin&password=tobira",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.is_empty());
    }
}
