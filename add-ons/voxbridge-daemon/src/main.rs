//! voxbridge daemon
//!
//! Leave this running while the client application is open. It listens on the configured
//! local port, answers each connection with a sentiment token, and writes spoken replies
//! to the configured audio path.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voxbridge_core::{BridgeConfig, BridgeServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[voxbridge] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BridgeConfig::load().context("load BridgeConfig")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        model = %config.llm_model,
        context_limit = config.context_limit,
        session_scope = ?config.session_scope,
        speech = config.speech_enabled(),
        transcription = config.transcription_enabled(),
        "voxbridge starting"
    );

    let server = BridgeServer::from_config(&config).context("build bridge")?;
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("bind {}:{}", config.host, config.port))?;

    server
        .serve(listener, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("CTRL-C received; shutting down bridge");
            }
        })
        .await?;
    Ok(())
}
