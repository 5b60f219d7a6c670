// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use vault_sync_server::{
    api::router,
    config::{ServerConfig, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::open_store,
};

/// Time in-flight requests get to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

async fn drain_on_shutdown(shutdown: CancellationToken, handle: Handle<SocketAddr>) {
    shutdown.cancelled().await;
    tracing::info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[tokio::main]
async fn main() {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = ServerConfig::from_env().expect("Invalid server configuration");
    init_tracing(config.json_logs);
    tracing::info!(?config, "Configuration loaded");
    if config.secret_generated {
        tracing::warn!("WARDEN_SECRET_PHRASE not set; generated a random one, tokens will not survive a restart");
    }

    let store = open_store(config.store_backend, &config.data_dir)
        .expect("Failed to open credential store");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");
    let tls = config.tls.clone();

    let app = router(AppState::new(store, config));

    // Ctrl-C cancels the token; cancellation drains the server.
    let shutdown = CancellationToken::new();
    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));
    tokio::spawn(drain_on_shutdown(shutdown.clone(), handle.clone()));

    match tls {
        Some(paths) => {
            let tls_config = RustlsConfig::from_pem_file(&paths.cert, &paths.key)
                .await
                .expect("Failed to load TLS certificate and key");
            tracing::info!(%addr, "Vault sync server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            tracing::info!(%addr, "Vault sync server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }

    tracing::info!("Server stopped");
}
