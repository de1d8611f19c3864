// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-assignment completion slot attached to every print job.
//
// The worker writes the job's `PrintOutcome` exactly once; any number of
// watchers may wait for it.  A second write is a silent no-op, because the
// worker can legitimately race a dispatcher that already gave up waiting.
//
// Built on `tokio::sync::watch`: the first `complete` flips the value from
// `None` to `Some` under the channel's own lock (`send_if_modified`), so the
// check-and-set cannot interleave with another writer.

use std::sync::Arc;

use tokio::sync::watch;

use printgate_core::types::PrintOutcome;

/// Writer side of a job's completion.  Cheap to clone; all clones share the
/// same slot.
#[derive(Debug, Clone)]
pub struct CompletionSlot {
    tx: Arc<watch::Sender<Option<PrintOutcome>>>,
}

/// Reader side of a job's completion.
#[derive(Debug, Clone)]
pub struct CompletionWatcher {
    rx: watch::Receiver<Option<PrintOutcome>>,
}

impl CompletionSlot {
    /// Create an empty slot and its first watcher.
    pub fn new() -> (Self, CompletionWatcher) {
        let (tx, rx) = watch::channel(None);
        (Self { tx: Arc::new(tx) }, CompletionWatcher { rx })
    }

    /// Store `outcome` if nothing has been stored yet.
    ///
    /// Returns `true` when this call won the write, `false` when the slot was
    /// already resolved (the earlier outcome is kept).
    pub fn complete(&self, outcome: PrintOutcome) -> bool {
        let mut outcome = Some(outcome);
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                false
            } else {
                *current = outcome.take();
                true
            }
        })
    }

    /// Whether an outcome has been stored.
    pub fn is_completed(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Current outcome, if resolved.
    pub fn outcome(&self) -> Option<PrintOutcome> {
        self.tx.borrow().clone()
    }

    /// Another watcher on this slot.
    pub fn subscribe(&self) -> CompletionWatcher {
        CompletionWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl CompletionWatcher {
    /// Wait for the outcome.
    ///
    /// Returns `None` if every `CompletionSlot` clone was dropped without a
    /// write, i.e. the job was abandoned.
    pub async fn wait(&mut self) -> Option<PrintOutcome> {
        let waited = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map(|value| value.clone());
        match waited {
            Ok(outcome) => outcome,
            // Sender gone: a final value may still have been written.
            Err(_) => self.rx.borrow().clone(),
        }
    }
}
