// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wiring of the print engine: routing cache, lock registry, executor, worker.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use printgate_core::config::{AppConfig, ExecutorKind};
use printgate_print::{
    Dispatcher, FileRoutingSource, JobQueue, PrintExecutor, PrintWorker, PrinterExecutor,
    PrinterLockRegistry, RoutingTableCache, SpoolExecutor,
};

/// Running engine: the dispatcher handlers call into, and the worker task.
pub struct PrintService {
    pub dispatcher: Dispatcher,
    pub worker: JoinHandle<()>,
}

impl PrintService {
    /// Start the worker on the current runtime.  It stops when `shutdown`
    /// fires.
    pub fn start(config: &AppConfig, shutdown: CancellationToken) -> Self {
        let executor: Arc<dyn PrintExecutor> = match config.executor {
            ExecutorKind::Printer => Arc::new(PrinterExecutor::new()),
            ExecutorKind::Spool => {
                let spool = SpoolExecutor::new(&config.spool_dir);
                info!(dir = %spool.dir().display(), "spooling documents instead of printing");
                Arc::new(spool)
            }
        };
        info!(
            executor = ?config.executor,
            routing = %config.routing_path.display(),
            "starting print worker"
        );

        let routing = Arc::new(RoutingTableCache::new(FileRoutingSource::new(
            &config.routing_path,
        )));
        Self::with_parts(routing, executor, shutdown)
    }

    /// Start with an explicit routing cache and executor.
    pub fn with_parts(
        routing: Arc<RoutingTableCache>,
        executor: Arc<dyn PrintExecutor>,
        shutdown: CancellationToken,
    ) -> Self {
        let (queue, jobs) = JobQueue::channel();
        let worker = PrintWorker::new(routing, Arc::new(PrinterLockRegistry::new()), executor)
            .spawn(jobs, shutdown);
        Self {
            dispatcher: Dispatcher::new(queue),
            worker,
        }
    }
}
