// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printgate — loopback print agent.
//
// Entry point.  Parses configuration, initialises logging, starts the print
// worker, and serves the HTTP API on 127.0.0.1 until shutdown.

use std::net::{Ipv4Addr, SocketAddr};
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use printgate_app::{AppState, Cli, PrintService, build_router, logging, shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Cli::parse().into_config();
    let _log_guard = logging::init(config.log_dir.as_deref());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Printgate starting");

    let token = CancellationToken::new();
    shutdown::install_signal_handler(token.clone());

    let service = PrintService::start(&config, token.clone());
    let state = AppState::new(service.dispatcher, token.clone(), config.require_bearer);
    if !config.require_bearer {
        tracing::warn!("bearer authentication disabled");
    }

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "cannot bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%addr, "listening");

    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let token = token.clone();
        async move { token.cancelled().await }
    });

    let served = server.await;
    token.cancel();
    if let Err(e) = service.worker.await {
        tracing::error!(error = %e, "print worker ended abnormally");
    }

    match served {
        Ok(()) => {
            tracing::info!("Printgate stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "server error");
            ExitCode::FAILURE
        }
    }
}
