//! `a2a-host`: serves the chat endpoints over a configured agent runtime.

use a2a_host_server::integrations::axum::HostRouter;
use a2a_host_server::{bootstrap_session, HostConfig, Runtime};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,a2a_host_server=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = HostConfig::parse();
    let session = config.session_key();

    let runtime = Runtime::from_config(&config).context("failed to build agent runner")?;
    runtime
        .runner
        .init()
        .await
        .context("agent runner initialization failed")?;
    tracing::info!(runner = runtime.runner.name(), url = %config.runner_url, "agent runner ready");

    bootstrap_session(runtime.sessions.as_ref(), &session).await;

    let app = HostRouter::new(runtime.runner.clone())
        .with_session(session)
        .with_body_limit(config.body_limit_bytes)
        .into_router();

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "A2A host agent listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    if let Err(err) = runtime.runner.shutdown().await {
        tracing::warn!(error = %err, "agent runner shutdown failed");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
