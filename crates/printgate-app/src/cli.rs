// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command line and environment configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use printgate_core::config::{AppConfig, ExecutorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutorArg {
    /// Print to the configured ipp://, ipps:// or socket:// printers.
    Printer,
    /// Write documents into the spool directory instead of printing.
    Spool,
}

impl From<ExecutorArg> for ExecutorKind {
    fn from(arg: ExecutorArg) -> Self {
        match arg {
            ExecutorArg::Printer => ExecutorKind::Printer,
            ExecutorArg::Spool => ExecutorKind::Spool,
        }
    }
}

/// Loopback print agent routing document types to printers and trays.
#[derive(Debug, Parser)]
#[command(name = "printgate", version, about)]
pub struct Cli {
    /// Port to listen on (127.0.0.1 only).
    #[arg(long, env = "PRINTGATE_PORT", default_value_t = 5017)]
    pub port: u16,

    /// Routing document mapping document types to printers.
    #[arg(
        long = "config",
        env = "PRINTGATE_CONFIG",
        default_value = "printers.config.json"
    )]
    pub routing_path: PathBuf,

    /// Directory for daily rolling log files.
    #[arg(long = "log", env = "PRINTGATE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, env = "PRINTGATE_EXECUTOR", value_enum, default_value_t = ExecutorArg::Printer)]
    pub executor: ExecutorArg,

    /// Spool directory for `--executor spool`.
    #[arg(long, env = "PRINTGATE_SPOOL_DIR")]
    pub spool_dir: Option<PathBuf>,

    /// Skip the bearer token check on /api routes.
    #[arg(long, env = "PRINTGATE_NO_AUTH")]
    pub no_auth: bool,
}

impl Cli {
    pub fn into_config(self) -> AppConfig {
        let defaults = AppConfig::default();
        AppConfig {
            port: self.port,
            routing_path: self.routing_path,
            log_dir: self.log_dir,
            executor: self.executor.into(),
            spool_dir: self.spool_dir.unwrap_or(defaults.spool_dir),
            require_bearer: !self.no_auth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_app_config() {
        let config = Cli::try_parse_from(["printgate"]).unwrap().into_config();
        let defaults = AppConfig::default();
        assert_eq!(config.port, defaults.port);
        assert_eq!(config.routing_path, defaults.routing_path);
        assert_eq!(config.executor, ExecutorKind::Printer);
        assert!(config.require_bearer);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Cli::try_parse_from([
            "printgate",
            "--port",
            "6001",
            "--config",
            "/etc/printgate/printers.json",
            "--log",
            "/var/log/printgate",
            "--executor",
            "spool",
            "--spool-dir",
            "/tmp/spool",
            "--no-auth",
        ])
        .unwrap()
        .into_config();

        assert_eq!(config.port, 6001);
        assert_eq!(config.routing_path, PathBuf::from("/etc/printgate/printers.json"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/printgate")));
        assert_eq!(config.executor, ExecutorKind::Spool);
        assert_eq!(config.spool_dir, PathBuf::from("/tmp/spool"));
        assert!(!config.require_bearer);
    }

    #[test]
    fn rejects_unknown_executor() {
        assert!(Cli::try_parse_from(["printgate", "--executor", "fax"]).is_err());
    }
}
