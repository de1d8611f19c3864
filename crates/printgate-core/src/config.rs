// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which print executor the worker hands jobs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Real printers, addressed by `ipp://`, `ipps://`, or `socket://` identifiers.
    Printer,
    /// Development mode: write each document into the spool directory.
    Spool,
}

/// Process-wide settings, assembled from the command line and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Loopback port for the HTTP API.
    pub port: u16,
    /// JSON document mapping document types to printers and trays.
    pub routing_path: PathBuf,
    /// Directory for daily rolling log files (stdout only when unset).
    pub log_dir: Option<PathBuf>,
    /// Executor backing the worker.
    pub executor: ExecutorKind,
    /// Target directory for the spool executor.
    pub spool_dir: PathBuf,
    /// Require a bearer token on `/api/*` routes.
    pub require_bearer: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5017,
            routing_path: PathBuf::from("printers.config.json"),
            log_dir: None,
            executor: ExecutorKind::Printer,
            spool_dir: std::env::temp_dir().join("printgate-spool"),
            require_bearer: true,
        }
    }
}
