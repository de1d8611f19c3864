// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process print job queue.
//
// Any number of dispatchers push jobs; exactly one worker drains them in
// arrival order.  The queue is unbounded: a request handler never waits for
// room, it only waits (bounded by the dispatch deadline) for its own job's
// outcome.  Jobs are not persisted; a restart drops whatever was pending.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::JobId;
use printgate_security::PayloadFingerprint;

use crate::completion::{CompletionSlot, CompletionWatcher};

/// A decoded document waiting to be routed and printed.
#[derive(Debug)]
pub struct PrintJob {
    pub id: JobId,
    pub document_type: String,
    /// Raw document bytes, decoded once by the dispatcher.
    pub payload: Vec<u8>,
    pub fingerprint: PayloadFingerprint,
    pub enqueued_at: DateTime<Utc>,
    /// Written exactly once by the worker.
    pub completion: CompletionSlot,
}

impl PrintJob {
    /// Build a job and hand back the watcher for its outcome.
    pub fn new(document_type: impl Into<String>, payload: Vec<u8>) -> (Self, CompletionWatcher) {
        let (completion, watcher) = CompletionSlot::new();
        let fingerprint = PayloadFingerprint::of(&payload);
        let job = Self {
            id: JobId::new(),
            document_type: document_type.into(),
            payload,
            fingerprint,
            enqueued_at: Utc::now(),
            completion,
        };
        (job, watcher)
    }
}

/// Producer handle.  Clone freely; every clone feeds the same worker.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<PrintJob>,
    depth: Arc<AtomicUsize>,
}

/// Consumer handle, owned by the single worker.
#[derive(Debug)]
pub struct JobReceiver {
    rx: mpsc::UnboundedReceiver<PrintJob>,
    depth: Arc<AtomicUsize>,
}

impl JobQueue {
    /// Create the queue and its one consumer.
    pub fn channel() -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicUsize::new(0));
        (
            Self {
                tx,
                depth: Arc::clone(&depth),
            },
            JobReceiver { rx, depth },
        )
    }

    /// Append a job.  Fails only when the worker has gone away.
    #[instrument(skip_all, fields(job_id = %job.id, document_type = %job.document_type))]
    pub fn submit(&self, job: PrintJob) -> Result<()> {
        // Count first so the worker can never observe a negative depth.
        self.depth.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(job).is_err() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            return Err(PrintgateError::QueueClosed);
        }
        debug!(pending = self.pending(), "job queued");
        Ok(())
    }

    /// Jobs submitted but not yet taken by the worker.
    pub fn pending(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Whether the consumer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl JobReceiver {
    /// Next job in FIFO order; `None` once every producer is gone.
    pub async fn recv(&mut self) -> Option<PrintJob> {
        let job = self.rx.recv().await?;
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Some(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn jobs_come_out_in_submission_order() {
        let (queue, mut rx) = JobQueue::channel();
        let mut ids = Vec::new();
        for doc in ["Invoice", "Label", "Receipt"] {
            let (job, _watcher) = PrintJob::new(doc, b"%PDF-1.4".to_vec());
            ids.push(job.id);
            queue.submit(job).expect("submit");
        }
        assert_eq!(queue.pending(), 3);

        for expected in ids {
            let job = rx.recv().await.expect("job");
            assert_eq!(job.id, expected);
        }
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn submit_after_consumer_dropped_fails() {
        let (queue, rx) = JobQueue::channel();
        drop(rx);
        let (job, _watcher) = PrintJob::new("Invoice", Vec::new());
        assert!(matches!(queue.submit(job), Err(PrintgateError::QueueClosed)));
        assert_eq!(queue.pending(), 0);
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn recv_ends_when_producers_are_gone() {
        let (queue, mut rx) = JobQueue::channel();
        drop(queue);
        assert!(rx.recv().await.is_none());
    }
}
