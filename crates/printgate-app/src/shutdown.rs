// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide shutdown signal.
//
// One `CancellationToken` is shared by the HTTP server, the print worker and
// the `/api/shutdown` route.  Whichever fires first (SIGINT, SIGTERM, or the
// route) cancels it; everything else drains off the same token.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Delay between answering `/api/shutdown` and cancelling, so the response
/// is flushed first.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(50);

/// Cancel `token` on SIGINT or SIGTERM.
pub fn install_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            () = wait_for_signal() => token.cancel(),
            () = token.cancelled() => {}
        }
    });
}

/// Cancel `token` after `delay`.
pub fn cancel_after(token: CancellationToken, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        info!("shutdown requested over HTTP");
        token.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGTERM; relying on SIGINT");
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        () = ctrl_c() => info!("received SIGINT, shutting down"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
    info!("received Ctrl-C, shutting down");
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
