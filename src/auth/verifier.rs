//! The verification delegate.

use async_trait::async_trait;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tower::BoxError;

use crate::auth::{LoginData, LoginOutcome};
use crate::http::BridgeError;

/// Credential check supplied by the embedding application.
///
/// One verifier instance is shared by every in-flight request and `check`
/// may be called concurrently. The bridge passes nothing but the immutable
/// `LoginData` into it, so making the implementation safe for concurrent use
/// is up to the embedder.
#[async_trait]
pub trait Verifier: Send + Sync + 'static {
    /// Returns `Forbidden` for rejected credentials. `Err` means the check
    /// itself could not be performed.
    async fn check(&self, login: &LoginData) -> Result<LoginOutcome, BoxError>;
}

/// Adapter turning an async closure into a [`Verifier`].
pub struct FnVerifier<F>(F);

/// Wraps `f` so it can be used as a verifier.
pub fn verifier_fn<F, Fut>(f: F) -> FnVerifier<F>
where
    F: Fn(LoginData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoginOutcome, BoxError>> + Send + 'static,
{
    FnVerifier(f)
}

#[async_trait]
impl<F, Fut> Verifier for FnVerifier<F>
where
    F: Fn(LoginData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoginOutcome, BoxError>> + Send + 'static,
{
    async fn check(&self, login: &LoginData) -> Result<LoginOutcome, BoxError> {
        (self.0)(login.clone()).await
    }
}

/// Runs the verifier, turning errors and panics into [`BridgeError::Verifier`].
pub(crate) async fn check(
    verifier: &dyn Verifier,
    login: &LoginData,
) -> Result<LoginOutcome, BridgeError> {
    match AssertUnwindSafe(verifier.check(login)).catch_unwind().await {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Login check failed");
            Err(BridgeError::Verifier)
        }
        Err(payload) => {
            tracing::error!(panic = panic_message(payload.as_ref()), "Login check panicked");
            Err(BridgeError::Verifier)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_outcome_through() {
        let verifier = verifier_fn(|login: LoginData| async move {
            assert_eq!(login.userid, "alice");
            Ok::<_, BoxError>(LoginOutcome::Forbidden)
        });
        let outcome = check(&verifier, &LoginData::new("alice", "pw")).await;
        assert_eq!(outcome, Ok(LoginOutcome::Forbidden));
    }

    #[tokio::test]
    async fn error_becomes_verifier_failure() {
        let verifier = verifier_fn(|_| async { Err::<LoginOutcome, BoxError>("ldap down".into()) });
        let outcome = check(&verifier, &LoginData::new("alice", "pw")).await;
        assert_eq!(outcome, Err(BridgeError::Verifier));
    }

    #[tokio::test]
    async fn panic_becomes_verifier_failure() {
        let verifier = verifier_fn(|_| async {
            if true {
                panic!("verifier exploded");
            }
            Ok::<_, BoxError>(LoginOutcome::Forbidden)
        });
        let outcome = check(&verifier, &LoginData::new("alice", "pw")).await;
        assert_eq!(outcome, Err(BridgeError::Verifier));
    }
}
