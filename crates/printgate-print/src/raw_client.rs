// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP transport for `socket://` printers (JetDirect).
//
// Open a socket, stream the document, close.  There is no status channel, so
// a clean shutdown is the only success signal available.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use printgate_core::error::{PrintgateError, Result};

/// Default JetDirect port.
pub const RAW_PORT: u16 = 9100;

const RAW_TIMEOUT: Duration = Duration::from_secs(10);
const CHUNK_SIZE: usize = 8192;

/// Stream `document_bytes` to `host:port`.
#[instrument(skip(document_bytes), fields(total = document_bytes.len()))]
pub async fn send_raw(host: &str, port: u16, document_bytes: &[u8]) -> Result<()> {
    let addr = format!("{host}:{port}");

    let mut stream = tokio::time::timeout(RAW_TIMEOUT, TcpStream::connect(&addr))
        .await
        .map_err(|_| {
            PrintgateError::RawSocket(format!(
                "connection to {addr} timed out after {}s",
                RAW_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| PrintgateError::RawSocket(format!("connect to {addr}: {e}")))?;

    let mut sent = 0usize;
    for chunk in document_bytes.chunks(CHUNK_SIZE) {
        tokio::time::timeout(RAW_TIMEOUT, stream.write_all(chunk))
            .await
            .map_err(|_| PrintgateError::RawSocket(format!("send to {addr} stalled at byte {sent}")))?
            .map_err(|e| PrintgateError::RawSocket(format!("send failed at byte {sent}: {e}")))?;
        sent += chunk.len();
        debug!(sent, "raw progress");
    }

    stream
        .flush()
        .await
        .map_err(|e| PrintgateError::RawSocket(format!("flush: {e}")))?;
    stream
        .shutdown()
        .await
        .map_err(|e| PrintgateError::RawSocket(format!("shutdown: {e}")))?;

    info!(addr = %addr, "raw job sent");
    Ok(())
}
