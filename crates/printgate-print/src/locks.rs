// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-printer mutual exclusion.
//
// Selecting a tray changes printer-wide state on many drivers, so two jobs
// for the same printer must never be submitted at the same time.  Today the
// single worker already serialises every submission; this registry is what
// keeps that guarantee if more workers are ever added.  Do not remove it as
// redundant.
//
// Locks are created lazily on first use and live as long as the registry.
// The map is sharded (`DashMap`), so get-or-create for one printer never
// contends with another printer's lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Guard proving exclusive use of one printer.  Released on drop.
#[derive(Debug)]
pub struct PrinterLease {
    printer: String,
    _guard: OwnedMutexGuard<()>,
}

impl PrinterLease {
    /// Identifier of the printer this lease holds.
    pub fn printer(&self) -> &str {
        &self.printer
    }
}

/// Lazily populated map from printer identifier to its lock.
#[derive(Debug, Default)]
pub struct PrinterLockRegistry {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PrinterLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `printer`, created on first request.  Repeated calls with
    /// the same identifier return the same instance.
    pub fn lock_for(&self, printer: &str) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.get(printer) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .locks
            .entry(printer.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Wait for exclusive use of `printer`.
    pub async fn acquire(&self, printer: &str) -> PrinterLease {
        let lock = self.lock_for(printer);
        let guard = lock.lock_owned().await;
        debug!(printer, "printer lock acquired");
        PrinterLease {
            printer: printer.to_owned(),
            _guard: guard,
        }
    }

    /// Non-blocking variant of [`acquire`](Self::acquire).
    pub fn try_acquire(&self, printer: &str) -> Option<PrinterLease> {
        let guard = self.lock_for(printer).try_lock_owned().ok()?;
        Some(PrinterLease {
            printer: printer.to_owned(),
            _guard: guard,
        })
    }

    /// Number of distinct printers seen so far.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn same_identifier_returns_same_lock() {
        let registry = PrinterLockRegistry::new();
        let a = registry.lock_for("HP1");
        let b = registry.lock_for("HP1");
        let c = registry.lock_for("HP2");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn second_holder_waits_for_release() {
        let registry = Arc::new(PrinterLockRegistry::new());
        let first = registry.acquire("HP1").await;

        let contender = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.acquire("HP1").await.printer().to_owned() })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(first);
        let printer = tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender should get the lock after release")
            .expect("task");
        assert_eq!(printer, "HP1");
    }

    #[tokio::test]
    async fn different_printers_do_not_block_each_other() {
        let registry = PrinterLockRegistry::new();
        let _hp1 = registry.acquire("HP1").await;

        let hp2 = tokio::time::timeout(Duration::from_millis(200), registry.acquire("HP2")).await;
        assert!(hp2.is_ok());
        assert!(registry.try_acquire("HP1").is_none());
    }

    #[tokio::test]
    async fn concurrent_first_use_creates_one_lock() {
        let registry = Arc::new(PrinterLockRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move { registry.lock_for("Zebra") }));
        }
        let mut locks = Vec::new();
        for h in handles {
            locks.push(h.await.expect("task"));
        }
        assert!(locks.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);
    }
}
