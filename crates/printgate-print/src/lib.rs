// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printgate Print — dispatcher, job queue, single print worker, routing
// cache, per-printer locks, and the executors that talk to printers.

pub mod completion;
pub mod dispatcher;
pub mod executor;
pub mod ipp_client;
pub mod locks;
pub mod queue;
pub mod raw_client;
pub mod routing;
pub mod spool;
pub mod worker;

pub use completion::{CompletionSlot, CompletionWatcher};
pub use dispatcher::{Dispatcher, PRINT_DEADLINE};
pub use executor::{PrintExecutor, PrintSubmission, PrinterExecutor};
pub use locks::{PrinterLease, PrinterLockRegistry};
pub use queue::{JobQueue, JobReceiver, PrintJob};
pub use routing::{
    FileRoutingSource, ROUTING_TTL, RoutingSource, RoutingTable, RoutingTableCache,
    StaticRoutingSource,
};
pub use spool::SpoolExecutor;
pub use worker::PrintWorker;
