//! My Jet - private jet booking backend
//! Mission: Register, log in with a cookie session, book and cancel flights

use anyhow::{Context, Result};
use clap::Parser;
use myjet_backend::{build_router, config, AppState, Config};
use std::{net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, time::interval};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    config::load_env();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    info!("🚀 My Jet backend starting");

    let state = AppState::from_config(&config)?;
    info!(
        "🔐 Sessions: {}s tokens, secure cookie = {}, ticket list = {:?}",
        config.token_ttl_secs, config.cookie_secure, config.list_policy
    );

    // Forget idle rate-limit buckets
    let limiter = state.login_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(300));
        loop {
            ticker.tick().await;
            limiter.cleanup();
        }
    });

    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

/// Initialize tracing; RUST_LOG overrides the default filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "myjet_backend=debug,myjet=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
}
