// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spool executor: writes documents to a directory instead of a printer.
//
// Used on machines without the target printers attached.  Files are named
// `<documentType>_<yyyyMMdd_HHmmss_fff>.pdf` (UTC) so an operator can see at
// a glance what would have printed and when.  Two documents of the same type
// landing in the same millisecond get `_1`, `_2`, ... appended; an existing
// file is never overwritten.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::info;

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::PrintOutcome;

use crate::executor::{PrintExecutor, PrintSubmission, precheck};

/// Collision suffixes tried before giving up on a file name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Executor that writes each accepted PDF into a spool directory.
#[derive(Debug, Clone)]
pub struct SpoolExecutor {
    dir: PathBuf,
}

impl SpoolExecutor {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_stem(document_type: &str) -> String {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let safe: String = document_type
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("{safe}_{stamp}")
    }

    /// Create `<stem>.pdf`, or the first free `<stem>_<n>.pdf`, and write
    /// `payload` into it.
    async fn write_new(&self, stem: &str, payload: &[u8]) -> Result<PathBuf> {
        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => format!("{stem}.pdf"),
                n => format!("{stem}_{n}.pdf"),
            };
            let path = self.dir.join(name);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                    continue;
                }
                Err(e) => {
                    return Err(PrintgateError::Spool(format!("create {}: {e}", path.display())));
                }
            };
            file.write_all(payload)
                .await
                .map_err(|e| PrintgateError::Spool(format!("write {}: {e}", path.display())))?;
            file.flush()
                .await
                .map_err(|e| PrintgateError::Spool(format!("flush {}: {e}", path.display())))?;
            return Ok(path);
        }
    }
}

#[async_trait]
impl PrintExecutor for SpoolExecutor {
    async fn submit(&self, submission: PrintSubmission<'_>) -> Result<PrintOutcome> {
        if let Some(code) = precheck(&submission) {
            return Ok(PrintOutcome::fail(code));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PrintgateError::Spool(format!("create {}: {e}", self.dir.display())))?;

        let stem = Self::file_stem(submission.document_type);
        let path = self.write_new(&stem, submission.payload).await?;

        info!(
            job_id = %submission.job_id,
            printer = submission.printer,
            tray = submission.tray,
            path = %path.display(),
            "document spooled"
        );
        Ok(PrintOutcome::ok())
    }
}
