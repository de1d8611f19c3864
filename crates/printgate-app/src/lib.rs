// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printgate application: CLI, logging, HTTP surface, and shutdown wiring
// around the print engine.

pub mod cli;
pub mod logging;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod state;

pub use cli::Cli;
pub use routes::build_router;
pub use services::PrintService;
pub use state::AppState;
