//! Startup orchestration.
//!
//! Fail fast: a config or bind error ends startup before any request is
//! accepted.

use std::sync::Arc;

use crate::auth::Verifier;
use crate::config::BridgeConfig;
use crate::http::{BridgeServer, ServerError};
use crate::lifecycle::{shutdown_signal, Shutdown};

/// Run the bridge described by `config` until SIGINT or SIGTERM.
pub async fn run(config: &BridgeConfig, verifier: Arc<dyn Verifier>) -> Result<(), ServerError> {
    let server = BridgeServer::from_config(config, verifier)?;
    run_until(server, Shutdown::new()).await
}

/// Run `server` until a signal arrives or `shutdown` is triggered.
pub async fn run_until(server: BridgeServer, shutdown: Shutdown) -> Result<(), ServerError> {
    let signal = shutdown.signal();
    let bound = server.bind().await?;

    let trigger = shutdown.clone();
    let watcher = tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    let result = bound.serve(signal).await;
    watcher.abort();
    result
}
