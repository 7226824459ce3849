//! `auth-bridge` binary.
//!
//! Runs the bridge with the built-in development accounts. Real deployments
//! embed the library and supply their own [`Verifier`](auth_bridge::Verifier).

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use auth_bridge::config::{
    load_config, validate_config, BridgeConfig, ConfigError, LogFormat, Mode,
};
use auth_bridge::{lifecycle, observability, DummyVerifier};

#[derive(Debug, Parser)]
#[command(name = "auth-bridge", version, about = "Login bridge between a login form and a host session service")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    /// TCP host to listen on.
    #[arg(long)]
    host: Option<String>,

    /// TCP port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Listen on this Unix socket instead of TCP.
    #[arg(long, conflicts_with_all = ["host", "port"])]
    socket: Option<PathBuf>,

    /// Host session service as HOST:PORT.
    #[arg(long, value_parser = parse_host_port, conflicts_with = "session_socket")]
    session_target: Option<(String, u16)>,

    /// Reach the host session service over this Unix socket.
    #[arg(long)]
    session_socket: Option<PathBuf>,

    /// Log filter, e.g. `info` or `auth_bridge=debug`.
    #[arg(long)]
    log_level: Option<String>,

    #[arg(long, value_enum)]
    log_format: Option<CliLogFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Callback,
    Proxy,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogFormat {
    Pretty,
    Json,
}

impl Cli {
    fn apply(self, config: &mut BridgeConfig) {
        if let Some(mode) = self.mode {
            config.mode = match mode {
                CliMode::Callback => Mode::Callback,
                CliMode::Proxy => Mode::Proxy,
            };
        }

        if let Some(path) = self.socket {
            config.listener.socket_path = Some(path);
            config.listener.host = None;
            config.listener.port = None;
        } else if self.host.is_some() || self.port.is_some() {
            config.listener.socket_path = None;
            config.listener.host = self.host.or(config.listener.host.take());
            config.listener.port = self.port.or(config.listener.port);
        }

        if let Some(path) = self.session_socket {
            config.session.socket_path = Some(path);
            config.session.host = None;
            config.session.port = None;
        } else if let Some((host, port)) = self.session_target {
            config.session.socket_path = None;
            config.session.host = Some(host);
            config.session.port = Some(port);
        }

        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = match format {
                CliLogFormat::Pretty => LogFormat::Pretty,
                CliLogFormat::Json => LogFormat::Json,
            };
        }
    }
}

fn parse_host_port(value: &str) -> Result<(String, u16), String> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected HOST:PORT, got '{value}'"))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(format!("missing host in '{value}'"));
    }
    let port = port.parse::<u16>().map_err(|e| format!("invalid port in '{value}': {e}"))?;
    Ok((host.to_string(), port))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    observability::init(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?config.mode,
        listener = %config.listener.target(),
        "auth-bridge starting"
    );
    if config.mode == Mode::Proxy {
        tracing::info!(session = %config.session.target(), "Sessions are created on the host");
    }
    tracing::warn!("Using the built-in development accounts, do not expose this instance");

    lifecycle::run(&config, Arc::new(DummyVerifier)).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
