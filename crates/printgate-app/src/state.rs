// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared state handed to every HTTP handler.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use printgate_print::Dispatcher;

use crate::shutdown::SHUTDOWN_GRACE;

#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub shutdown: CancellationToken,
    pub require_bearer: bool,
    pub shutdown_grace: Duration,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, shutdown: CancellationToken, require_bearer: bool) -> Self {
        Self {
            dispatcher,
            shutdown,
            require_bearer,
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }
}
