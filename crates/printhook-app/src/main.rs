// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printhook: webhook-to-printer bridge.
//
// Entry point. Initialises logging, loads settings and the options file,
// checks the print server, registers the print service with the supervisor,
// then serves the HTTP API until Ctrl-C.

use printhook_app::{ServiceContext, ServiceRegistrar, Settings, router};
use printhook_core::error::Result;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Printhook starting");

    let settings = Settings::from_env()?;
    let ctx = match ServiceContext::init(&settings).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return Err(e);
        }
    };

    ServiceRegistrar::new(reqwest::Client::new(), settings.supervisor_token.clone())
        .spawn(settings.service_definitions.clone());

    let listener = TcpListener::bind(settings.listen_addr).await?;
    tracing::info!(addr = %settings.listen_addr, "listening");

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Printhook stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
