// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

use std::env;
use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use bridgeworld_idp::{
    api::router,
    config::{GatewayConfig, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV},
    identity::CanonicalIdentity,
    state::AppState,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = env::var(LOG_FORMAT_ENV).unwrap_or_default();

    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = GatewayConfig::from_env();
    let identity = CanonicalIdentity::from_env();
    tracing::info!(
        issuer = %config.issuer,
        subject = %identity.primary_email,
        "starting identity gateway"
    );

    let state = AppState::new(identity, config);
    let app = router(state);

    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = match format!("{host}:{port}").parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("invalid bind address {host}:{port}: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("listening on http://{addr} (docs at /docs)");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("shutdown signal received");
}
