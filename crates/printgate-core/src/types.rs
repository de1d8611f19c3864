// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Printgate print agent.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a print job, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inbound operation descriptor posted to `/api/execute`.
///
/// Field names follow the external JSON contract (`actionType`,
/// `parameters`); the PascalCase spellings older clients send are accepted
/// as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    #[serde(default, alias = "ActionType")]
    pub action_type: String,
    #[serde(default, alias = "Parameters")]
    pub parameters: HashMap<String, Value>,
}

impl ActionRequest {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            parameters: HashMap::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Result of one `/api/execute` call.
///
/// `status_code` becomes the HTTP status; it is not part of the JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    #[serde(skip)]
    pub status_code: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionResult {
    /// 202 Accepted with a message.
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            status_code: 202,
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Failure with the given HTTP status and message code.
    pub fn fail(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Failure codes a print attempt can end with.
///
/// The first three are caller-correctable execution failures; the routing
/// codes carry the document type that could not be routed.  `Other` passes an
/// executor's message through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintErrorCode {
    PrinterNotFound,
    InvalidTray,
    FileNotValid,
    /// No routing entry exists for this document type.
    NoPrinterMapping(String),
    /// A routing entry exists but its printer identifier is blank.
    PrinterNotConfigured(String),
    /// The routing document could not be loaded.
    RoutingUnavailable(String),
    Other(String),
}

impl PrintErrorCode {
    /// Execution failures the caller can fix by changing the request or
    /// the printer setup.
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            Self::PrinterNotFound | Self::InvalidTray | Self::FileNotValid
        )
    }

    /// Failures raised while resolving the document type to a printer.
    pub fn is_routing(&self) -> bool {
        matches!(self, Self::NoPrinterMapping(_) | Self::PrinterNotConfigured(_))
    }
}

impl fmt::Display for PrintErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrinterNotFound => f.write_str("printer_not_found"),
            Self::InvalidTray => f.write_str("invalid_tray"),
            Self::FileNotValid => f.write_str("file_not_valid"),
            Self::NoPrinterMapping(doc) => write!(f, "no_printer_mapping_for:{doc}"),
            Self::PrinterNotConfigured(doc) => write!(f, "printer_not_configured_for:{doc}"),
            Self::RoutingUnavailable(detail) => write!(f, "routing_unavailable:{detail}"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

/// What the worker reports back through a job's completion slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOutcome {
    pub success: bool,
    pub error_code: Option<PrintErrorCode>,
}

impl PrintOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_code: None,
        }
    }

    pub fn fail(code: PrintErrorCode) -> Self {
        Self {
            success: false,
            error_code: Some(code),
        }
    }

    /// Failure carrying an opaque message (executor errors, panics).
    pub fn fail_message(message: impl Into<String>) -> Self {
        Self::fail(PrintErrorCode::Other(message.into()))
    }
}

/// Sentinel tray value meaning "let the printer pick".
pub const AUTOMATIC_TRAY: &str = "Auto";

/// Where documents of one type are printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterMapping {
    #[serde(
        rename = "printerName",
        alias = "PrinterName",
        alias = "printerIdentifier",
        alias = "PrinterIdentifier",
        alias = "printername",
        alias = "printeridentifier",
        default
    )]
    pub printer_identifier: String,
    #[serde(
        rename = "tray",
        alias = "Tray",
        alias = "trayIdentifier",
        alias = "TrayIdentifier",
        alias = "trayidentifier",
        default = "default_tray"
    )]
    pub tray_identifier: String,
}

fn default_tray() -> String {
    AUTOMATIC_TRAY.to_owned()
}

impl PrinterMapping {
    pub fn new(printer_identifier: impl Into<String>, tray_identifier: impl Into<String>) -> Self {
        Self {
            printer_identifier: printer_identifier.into(),
            tray_identifier: tray_identifier.into(),
        }
    }

    /// Mapping that lets the printer choose the tray.
    pub fn automatic(printer_identifier: impl Into<String>) -> Self {
        Self::new(printer_identifier, AUTOMATIC_TRAY)
    }

    /// True when the printer identifier is empty or whitespace.
    pub fn is_unconfigured(&self) -> bool {
        self.printer_identifier.trim().is_empty()
    }
}

/// Physical paper source, normalised from the free-form tray names used in
/// routing documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrayKind {
    Upper,
    Lower,
    Middle,
    Manual,
    Automatic,
}

impl TrayKind {
    /// Normalise a tray name.  Unknown names fall back to `Automatic`.
    pub fn parse(tray: &str) -> Self {
        match tray.trim().to_ascii_uppercase().as_str() {
            "UPPER" | "TRAY1" | "TRAY 1" => Self::Upper,
            "LOWER" | "TRAY2" | "TRAY 2" => Self::Lower,
            "MP TRAY" | "MANUAL FEEDER" | "MANUAL" | "MP" => Self::Manual,
            "MIDDLE" => Self::Middle,
            _ => Self::Automatic,
        }
    }

    /// IPP `media-source` keyword (PWG 5100.7) for this paper source.
    pub fn ipp_media_source(&self) -> &'static str {
        match self {
            Self::Upper => "top",
            Self::Lower => "bottom",
            Self::Middle => "middle",
            Self::Manual => "manual",
            Self::Automatic => "auto",
        }
    }
}
