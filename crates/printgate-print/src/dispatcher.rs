// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request-side entry point: validate an action, queue the job, and wait a
// bounded time for the worker's verdict.
//
// Status mapping:
//
//   validation failure                      → 400
//   printed                                 → 202 print_accepted
//   printer_not_found/invalid_tray/file_not_valid → 400 <code>
//   no mapping / printer not configured     → 404 <code>
//   any other failure                       → 500 print_failed:<code>
//   worker gone                             → 500 print_failed_exception
//   deadline passed                         → 504 print_timeout
//
// A timed-out job is not cancelled.  The worker finishes it and writes the
// slot; nobody is listening any more.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use printgate_core::types::{ActionRequest, ActionResult, PrintOutcome};

use crate::queue::{JobQueue, PrintJob};

/// How long a request waits for its job's outcome.
pub const PRINT_DEADLINE: Duration = Duration::from_secs(20);

const PRINT_ACTION: &str = "Print";
const DOCUMENT_TYPE: &str = "documentType";
const FILE_BASE64: &str = "fileBase64";

/// Request-side handle onto the job queue.  Cheap to clone; every clone
/// feeds the same worker.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    queue: JobQueue,
    deadline: Duration,
}

impl Dispatcher {
    pub fn new(queue: JobQueue) -> Self {
        Self::with_deadline(queue, PRINT_DEADLINE)
    }

    pub fn with_deadline(queue: JobQueue, deadline: Duration) -> Self {
        Self { queue, deadline }
    }

    /// Handle one action request.  Never panics on bad input and never
    /// returns an error; every failure is an `ActionResult`.
    #[instrument(skip_all, fields(action = %request.action_type))]
    pub async fn execute(&self, request: ActionRequest) -> ActionResult {
        let action = request.action_type.trim();
        if action.is_empty() {
            return ActionResult::fail(400, "missing_actionType");
        }
        if !action.eq_ignore_ascii_case(PRINT_ACTION) {
            return ActionResult::fail(400, format!("unknown_actionType:{action}"));
        }
        self.print(&request).await
    }

    async fn print(&self, request: &ActionRequest) -> ActionResult {
        let document_type = match string_parameter(request, DOCUMENT_TYPE) {
            Ok(value) => value.to_owned(),
            Err(result) => return result,
        };
        let encoded = match string_parameter(request, FILE_BASE64) {
            Ok(value) => value,
            Err(result) => return result,
        };

        let payload = match decode_payload(encoded) {
            Some(bytes) => bytes,
            None => return ActionResult::fail(400, "fileBase64_not_valid_base64"),
        };

        let (job, mut watcher) = PrintJob::new(document_type, payload);
        let job_id = job.id;
        info!(%job_id, document_type = %job.document_type, payload = %job.fingerprint, "print requested");

        if let Err(e) = self.queue.submit(job) {
            error!(%job_id, error = %e, "could not queue print job");
            return ActionResult::fail(500, "print_failed_exception");
        }

        match tokio::time::timeout(self.deadline, watcher.wait()).await {
            Ok(Some(outcome)) => outcome_to_result(outcome),
            Ok(None) => {
                error!(%job_id, "job abandoned without an outcome");
                ActionResult::fail(500, "print_failed_exception")
            }
            Err(_) => {
                warn!(
                    %job_id,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "print deadline passed; outcome will arrive unobserved"
                );
                ActionResult::fail(504, "print_timeout")
            }
        }
    }
}

/// Fetch a required string parameter, unmodified.  Missing or `null` →
/// `missing_<name>`; blank or not a string → `invalid_<name>`.
fn string_parameter<'a>(request: &'a ActionRequest, name: &str) -> Result<&'a str, ActionResult> {
    match request.parameters.get(name) {
        None | Some(Value::Null) => Err(ActionResult::fail(400, format!("missing_{name}"))),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(_) => Err(ActionResult::fail(400, format!("invalid_{name}"))),
    }
}

/// Standard base64 with padding; ASCII whitespace (line breaks from MIME
/// encoders) is ignored.
fn decode_payload(encoded: &str) -> Option<Vec<u8>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact).ok()
}

fn outcome_to_result(outcome: PrintOutcome) -> ActionResult {
    if outcome.success {
        return ActionResult::accepted("print_accepted");
    }
    match outcome.error_code {
        Some(code) if code.is_caller_correctable() => ActionResult::fail(400, code.to_string()),
        Some(code) if code.is_routing() => ActionResult::fail(404, code.to_string()),
        Some(code) => ActionResult::fail(500, format!("print_failed:{code}")),
        None => ActionResult::fail(500, "print_failed:unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printgate_core::types::PrintErrorCode;

    fn print_request(doc: Value, file: Value) -> ActionRequest {
        ActionRequest::new("print")
            .with_parameter(DOCUMENT_TYPE, doc)
            .with_parameter(FILE_BASE64, file)
    }

    fn dispatcher() -> (Dispatcher, crate::queue::JobReceiver) {
        let (queue, rx) = JobQueue::channel();
        (Dispatcher::new(queue), rx)
    }

    #[tokio::test]
    async fn rejects_missing_and_unknown_actions() {
        let (d, _rx) = dispatcher();
        assert_eq!(
            d.execute(ActionRequest::new("  ")).await,
            ActionResult::fail(400, "missing_actionType")
        );
        assert_eq!(
            d.execute(ActionRequest::new("Scan")).await,
            ActionResult::fail(400, "unknown_actionType:Scan")
        );
    }

    #[tokio::test]
    async fn parameter_validation_names_the_field() {
        let (d, _rx) = dispatcher();

        let missing = ActionRequest::new("Print").with_parameter(FILE_BASE64, "JVBERi0=");
        assert_eq!(d.execute(missing).await.message.as_deref(), Some("missing_documentType"));

        let null = print_request(Value::Null, "JVBERi0=".into());
        assert_eq!(d.execute(null).await.message.as_deref(), Some("missing_documentType"));

        let blank = print_request(" ".into(), "JVBERi0=".into());
        assert_eq!(d.execute(blank).await.message.as_deref(), Some("invalid_documentType"));

        let number = print_request("Invoice".into(), 42.into());
        assert_eq!(d.execute(number).await.message.as_deref(), Some("invalid_fileBase64"));

        let absent = ActionRequest::new("Print").with_parameter(DOCUMENT_TYPE, "Invoice");
        assert_eq!(d.execute(absent).await.message.as_deref(), Some("missing_fileBase64"));
    }

    #[test]
    fn decodes_standard_base64_ignoring_whitespace() {
        assert_eq!(decode_payload("JVBE\r\nRi0x\nLjQ=").as_deref(), Some(&b"%PDF-1.4"[..]));
        assert!(decode_payload("not-base64!!").is_none());
        assert!(decode_payload("JVBERi0xLjQ").is_none());
    }

    #[test]
    fn outcomes_map_to_statuses() {
        assert_eq!(outcome_to_result(PrintOutcome::ok()).status_code, 202);
        assert_eq!(
            outcome_to_result(PrintOutcome::fail(PrintErrorCode::InvalidTray)),
            ActionResult::fail(400, "invalid_tray")
        );
        assert_eq!(
            outcome_to_result(PrintOutcome::fail(PrintErrorCode::PrinterNotConfigured("Label".into()))),
            ActionResult::fail(404, "printer_not_configured_for:Label")
        );
        assert_eq!(
            outcome_to_result(PrintOutcome::fail(PrintErrorCode::RoutingUnavailable("gone".into()))),
            ActionResult::fail(500, "print_failed:routing_unavailable:gone")
        );
        assert_eq!(
            outcome_to_result(PrintOutcome::fail_message("paper jam")),
            ActionResult::fail(500, "print_failed:paper jam")
        );
    }

    #[tokio::test]
    async fn document_type_reaches_the_job_unchanged() {
        let (d, mut rx) = dispatcher();
        let worker = tokio::spawn(async move {
            let job = rx.recv().await.expect("job");
            let seen = job.document_type.clone();
            job.completion.complete(PrintOutcome::ok());
            seen
        });

        let result = d.execute(print_request(" Invoice ".into(), "JVBERi0=".into())).await;
        assert!(result.success);
        assert_eq!(worker.await.unwrap(), " Invoice ");
    }

    #[tokio::test]
    async fn closed_queue_is_a_generic_failure() {
        let (d, rx) = dispatcher();
        drop(rx);
        let result = d.execute(print_request("Invoice".into(), "JVBERi0=".into())).await;
        assert_eq!(result, ActionResult::fail(500, "print_failed_exception"));
    }

    #[tokio::test]
    async fn abandoned_job_is_a_generic_failure() {
        let (d, mut rx) = dispatcher();
        tokio::spawn(async move {
            // Take the job and drop it without writing an outcome.
            let _ = rx.recv().await;
        });
        let result = d.execute(print_request("Invoice".into(), "JVBERi0=".into())).await;
        assert_eq!(result, ActionResult::fail(500, "print_failed_exception"));
    }
}
