// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The print worker.
//
// One long-lived task drains the job queue in order.  For each job it
// resolves the routing entry, takes the printer's lock, runs the executor and
// writes the outcome into the job's completion slot.  Nothing a single job
// does (routing failure, executor error, executor panic) ends the loop; only
// shutdown or the last producer going away does.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use printgate_core::types::{PrintErrorCode, PrintOutcome, PrinterMapping};

use crate::executor::{PrintExecutor, PrintSubmission};
use crate::locks::PrinterLockRegistry;
use crate::queue::{JobReceiver, PrintJob};
use crate::routing::RoutingTableCache;

/// Single consumer of the job queue.
///
/// Owns the routing cache, the printer lock registry, and the executor that
/// talks to devices.  Build one per queue and hand it to [`spawn`](Self::spawn).
pub struct PrintWorker {
    routing: Arc<RoutingTableCache>,
    locks: Arc<PrinterLockRegistry>,
    executor: Arc<dyn PrintExecutor>,
}

impl PrintWorker {
    pub fn new(
        routing: Arc<RoutingTableCache>,
        locks: Arc<PrinterLockRegistry>,
        executor: Arc<dyn PrintExecutor>,
    ) -> Self {
        Self {
            routing,
            locks,
            executor,
        }
    }

    /// Start draining `jobs` on the runtime.
    pub fn spawn(self, jobs: JobReceiver, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(jobs, shutdown))
    }

    /// Drain `jobs` until shutdown is requested or every producer is gone.
    pub async fn run(self, mut jobs: JobReceiver, shutdown: CancellationToken) {
        info!("print worker started");
        loop {
            let job = tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    info!("print worker stopping: shutdown requested");
                    break;
                }
                job = jobs.recv() => match job {
                    Some(job) => job,
                    None => {
                        info!("print worker stopping: queue closed");
                        break;
                    }
                },
            };
            self.process(job).await;
        }
    }

    #[instrument(skip_all, fields(job_id = %job.id, document_type = %job.document_type, payload = %job.fingerprint))]
    async fn process(&self, job: PrintJob) {
        let waited_ms = (Utc::now() - job.enqueued_at).num_milliseconds();
        debug!(waited_ms, "job dequeued");

        let outcome = match self.resolve(&job.document_type).await {
            Ok(mapping) => self.print(&job, &mapping).await,
            Err(code) => {
                warn!(code = %code, "job not routable");
                PrintOutcome::fail(code)
            }
        };

        if outcome.success {
            info!("job printed");
        } else {
            debug!(outcome = ?outcome.error_code, "job failed");
        }

        if !job.completion.complete(outcome) {
            warn!("completion already set; outcome discarded");
        }
    }

    /// Routing lookup.  The source may block on disk, so it runs off the
    /// async threads.
    async fn resolve(&self, document_type: &str) -> Result<PrinterMapping, PrintErrorCode> {
        let routing = Arc::clone(&self.routing);
        let key = document_type.to_owned();
        let looked_up = tokio::task::spawn_blocking(move || routing.lookup(&key)).await;

        let mapping = match looked_up {
            Ok(Ok(Some(mapping))) => mapping,
            Ok(Ok(None)) => return Err(PrintErrorCode::NoPrinterMapping(document_type.to_owned())),
            Ok(Err(e)) => {
                error!(error = %e, "routing source unavailable");
                return Err(PrintErrorCode::RoutingUnavailable(e.to_string()));
            }
            Err(e) => {
                error!(error = %e, "routing lookup task failed");
                return Err(PrintErrorCode::RoutingUnavailable(e.to_string()));
            }
        };

        if mapping.is_unconfigured() {
            return Err(PrintErrorCode::PrinterNotConfigured(document_type.to_owned()));
        }
        Ok(mapping)
    }

    async fn print(&self, job: &PrintJob, mapping: &PrinterMapping) -> PrintOutcome {
        let printer = mapping.printer_identifier.trim();
        let _lease = self.locks.acquire(printer).await;

        let submission = PrintSubmission {
            job_id: job.id,
            document_type: &job.document_type,
            payload: &job.payload,
            printer,
            tray: &mapping.tray_identifier,
        };

        match AssertUnwindSafe(self.executor.submit(submission))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(printer, error = %e, "executor failed");
                PrintOutcome::fail_message(e.to_string())
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "executor panicked".to_owned());
                error!(printer, panic = %detail, "executor panicked");
                PrintOutcome::fail_message(detail)
            }
        }
    }
}
