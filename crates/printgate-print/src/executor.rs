// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print executor boundary.
//
// The worker hands each routed job to a `PrintExecutor`.  An executor either
// reports an outcome (success, or a known failure code) or returns an error,
// which the worker turns into an opaque failure.  Executors may block on the
// network for as long as their own transport timeout allows.
//
// `PrinterExecutor` picks a transport from the printer identifier:
//
//   ipp://host[:port]/path, ipps://...  → IPP Print-Job with `media-source`
//   socket://host[:port]                → raw TCP (JetDirect, default 9100)
//
// Anything else is reported as `printer_not_found`.

use async_trait::async_trait;
use tracing::{info, warn};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::{JobId, PrintErrorCode, PrintOutcome, TrayKind};

use crate::ipp_client::IppClient;
use crate::raw_client::{self, RAW_PORT};

/// Magic bytes every PDF starts with.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// MIME type sent with every document.
pub const PDF_MIME: &str = "application/pdf";

/// One routed job, as seen by an executor.
#[derive(Debug, Clone, Copy)]
pub struct PrintSubmission<'a> {
    pub job_id: JobId,
    pub document_type: &'a str,
    pub payload: &'a [u8],
    pub printer: &'a str,
    pub tray: &'a str,
}

/// Performs the actual print.  Implementations must be shareable across
/// tasks; the worker holds one behind an `Arc`.
#[async_trait]
pub trait PrintExecutor: Send + Sync {
    async fn submit(&self, submission: PrintSubmission<'_>) -> Result<PrintOutcome>;
}

/// Checks shared by every executor before any transport is opened.
///
/// Returns the failure code when the submission cannot be printed.
pub fn precheck(submission: &PrintSubmission<'_>) -> Option<PrintErrorCode> {
    if !submission.payload.starts_with(PDF_MAGIC) {
        return Some(PrintErrorCode::FileNotValid);
    }
    if submission.tray.trim().is_empty() {
        return Some(PrintErrorCode::InvalidTray);
    }
    None
}

/// Parsed printer identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterTarget {
    /// Full `ipp://` or `ipps://` URI.
    Ipp(String),
    /// Raw TCP endpoint.
    Socket { host: String, port: u16 },
}

impl PrinterTarget {
    pub fn parse(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        let lower = identifier.to_ascii_lowercase();

        if lower.starts_with("ipp://") || lower.starts_with("ipps://") {
            return Ok(Self::Ipp(identifier.to_owned()));
        }

        if lower.starts_with("socket://") {
            let rest = identifier["socket://".len()..].trim_end_matches('/');
            let (host, port) = match rest.rsplit_once(':') {
                Some((host, port)) => {
                    let port = port.parse::<u16>().map_err(|_| {
                        PrintgateError::InvalidPrinterIdentifier(identifier.to_owned())
                    })?;
                    (host, port)
                }
                None => (rest, RAW_PORT),
            };
            if host.is_empty() {
                return Err(PrintgateError::InvalidPrinterIdentifier(identifier.to_owned()));
            }
            return Ok(Self::Socket {
                host: host.to_owned(),
                port,
            });
        }

        Err(PrintgateError::InvalidPrinterIdentifier(identifier.to_owned()))
    }
}

/// Executor for real printers reachable over the network.
#[derive(Debug, Default, Clone)]
pub struct PrinterExecutor;

impl PrinterExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PrintExecutor for PrinterExecutor {
    async fn submit(&self, submission: PrintSubmission<'_>) -> Result<PrintOutcome> {
        if let Some(code) = precheck(&submission) {
            return Ok(PrintOutcome::fail(code));
        }

        let target = match PrinterTarget::parse(submission.printer) {
            Ok(target) => target,
            Err(e) => {
                warn!(job_id = %submission.job_id, error = %e, "unrecognised printer identifier");
                return Ok(PrintOutcome::fail(PrintErrorCode::PrinterNotFound));
            }
        };

        let tray = TrayKind::parse(submission.tray);
        match target {
            PrinterTarget::Ipp(uri) => {
                let client = match IppClient::new(&uri) {
                    Ok(client) => client,
                    Err(e) => {
                        warn!(job_id = %submission.job_id, error = %e, "printer URI rejected");
                        return Ok(PrintOutcome::fail(PrintErrorCode::PrinterNotFound));
                    }
                };
                let job_name = format!("{}-{}", submission.document_type, submission.job_id);
                client
                    .print_job(submission.payload.to_vec(), &job_name, tray)
                    .await
            }
            PrinterTarget::Socket { host, port } => {
                if tray != TrayKind::Automatic {
                    // Raw sockets carry no job attributes; the printer's own
                    // default tray is used.
                    warn!(
                        job_id = %submission.job_id,
                        tray = submission.tray,
                        "tray selection is not supported over raw sockets"
                    );
                }
                raw_client::send_raw(&host, port, submission.payload).await?;
                info!(job_id = %submission.job_id, host = %host, port, "document streamed to printer");
                Ok(PrintOutcome::ok())
            }
        }
    }
}
