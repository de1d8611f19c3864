// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Printgate.
//
// These are internal errors.  Nothing here is shown to an HTTP caller
// verbatim: the dispatcher folds every failure into an `ActionResult` and the
// worker folds every failure into a `PrintOutcome`.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Printgate operations.
#[derive(Debug, Error)]
pub enum PrintgateError {
    // -- Routing --
    #[error("routing document {path} could not be read: {source}")]
    RoutingSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("routing document is malformed: {0}")]
    RoutingFormat(String),

    // -- Queue / worker --
    #[error("print queue is closed")]
    QueueClosed,

    // -- Execution --
    #[error("invalid printer identifier: {0}")]
    InvalidPrinterIdentifier(String),

    #[error("IPP request failed: {0}")]
    IppRequest(String),

    #[error("raw socket transfer failed: {0}")]
    RawSocket(String),

    #[error("spool write failed: {0}")]
    Spool(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintgateError>;
