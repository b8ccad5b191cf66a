// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum_server::Handle;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use webauthn_relay::{
    api::router,
    config::{LogFormat, RelayConfig, DEFAULT_LOG_FILTER},
    state::AppState,
    upstream::UpstreamClient,
};

/// How long in-flight relays get to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() {
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let upstream = match UpstreamClient::new(config.upstream_url.clone(), config.upstream_timeout)
    {
        Ok(upstream) => upstream,
        Err(e) => {
            error!(error = %e, "Failed to create upstream client");
            std::process::exit(1);
        }
    };

    let app = router(AppState::new(upstream));

    let handle: Handle<std::net::SocketAddr> = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested, draining in-flight requests");
                handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            }
        }
    });

    info!(
        addr = %config.bind_addr,
        upstream = %config.upstream_url,
        timeout_secs = config.upstream_timeout.as_secs(),
        "WebAuthn relay listening (docs at /docs)"
    );

    if let Err(e) = axum_server::bind(config.bind_addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
    {
        error!(error = %e, "HTTP server failed");
        std::process::exit(1);
    }
}
