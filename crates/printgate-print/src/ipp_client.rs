// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// IPP Print-Job submission (RFC 8011 §4.2.1).
//
// A printer answers with a status code.  Codes that describe something the
// caller can fix (unknown printer, unsupported tray, unreadable document) are
// mapped to `PrintErrorCode`s and reported as an outcome; anything else is
// returned as an error and becomes an opaque failure upstream.

use std::io::Cursor;
use std::time::Duration;

use ipp::prelude::*;
use tracing::{error, info, instrument};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::{PrintErrorCode, PrintOutcome, TrayKind};

use crate::executor::PDF_MIME;

/// Upper bound on a single Print-Job exchange.
const IPP_TIMEOUT: Duration = Duration::from_secs(10);

/// IPP client bound to one printer URI.
pub struct IppClient {
    uri: Uri,
}

impl IppClient {
    pub fn new(uri: &str) -> Result<Self> {
        let parsed: Uri = uri.parse().map_err(|e| {
            PrintgateError::InvalidPrinterIdentifier(format!("invalid URI '{uri}': {e}"))
        })?;
        Ok(Self { uri: parsed })
    }

    /// Send `document_bytes` as a PDF Print-Job, selecting `tray` through the
    /// `media-source` job attribute.
    #[instrument(skip(self, document_bytes), fields(uri = %self.uri, job_name = %job_name, tray = ?tray))]
    pub async fn print_job(
        &self,
        document_bytes: Vec<u8>,
        job_name: &str,
        tray: TrayKind,
    ) -> Result<PrintOutcome> {
        let payload = IppPayload::new(Cursor::new(document_bytes));

        let mut builder = IppOperationBuilder::print_job(self.uri.clone(), payload)
            .job_title(job_name)
            .document_format(PDF_MIME);
        if tray != TrayKind::Automatic {
            builder = builder.attribute(IppAttribute::new(
                "media-source",
                IppValue::Keyword(tray.ipp_media_source().into()),
            ));
        }
        let operation = builder.build();

        let client = AsyncIppClient::new(self.uri.clone());

        info!("sending Print-Job");
        let response = tokio::time::timeout(IPP_TIMEOUT, client.send(operation))
            .await
            .map_err(|_| {
                PrintgateError::IppRequest(format!(
                    "Print-Job timed out after {}s",
                    IPP_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| PrintgateError::IppRequest(format!("Print-Job: {e}")))?;

        let status = response.header().status_code();
        if status.is_success() {
            info!("print job accepted by printer");
            return Ok(PrintOutcome::ok());
        }

        let status = format!("{status:?}");
        error!(status = %status, "Print-Job failed");
        match classify_status(&status) {
            Some(code) => Ok(PrintOutcome::fail(code)),
            None => Err(PrintgateError::IppRequest(format!(
                "Print-Job returned status {status}"
            ))),
        }
    }
}

/// Map a non-success IPP status (its `Debug` name) to a known failure code.
fn classify_status(status: &str) -> Option<PrintErrorCode> {
    if status.contains("NotFound") || status.contains("NotPossible") {
        Some(PrintErrorCode::PrinterNotFound)
    } else if status.contains("DocumentFormat") || status.contains("CompressionNotSupported") {
        Some(PrintErrorCode::FileNotValid)
    } else if status.contains("AttributesOrValues") || status.contains("ConflictingAttributes") {
        Some(PrintErrorCode::InvalidTray)
    } else {
        None
    }
}
