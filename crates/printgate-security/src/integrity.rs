// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload fingerprints: SHA-256 digests that let log lines identify a
// document without ever writing its bytes.

use std::fmt;

use sha2::{Digest, Sha256};

/// Number of hex characters shown by the short `Display` form.
const SHORT_LEN: usize = 12;

/// Digest and size of a decoded print payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFingerprint {
    /// Lowercase hex SHA-256 of the payload.
    pub sha256: String,
    /// Payload length in bytes.
    pub len: usize,
}

impl PayloadFingerprint {
    /// Fingerprint `data`.
    pub fn of(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        Self {
            sha256: hex::encode(digest),
            len: data.len(),
        }
    }

    /// Leading hex characters of the digest, enough to correlate logs.
    pub fn short(&self) -> &str {
        &self.sha256[..SHORT_LEN]
    }
}

impl fmt::Display for PayloadFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{} ({} bytes)", self.short(), self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn fingerprint_empty_input() {
        let fp = PayloadFingerprint::of(b"");
        assert_eq!(fp.sha256, EMPTY_SHA256);
        assert_eq!(fp.len, 0);
    }

    #[test]
    fn display_uses_short_digest() {
        // SHA-256("hello"), verified against coreutils sha256sum.
        let fp = PayloadFingerprint::of(b"hello");
        assert_eq!(fp.to_string(), "sha256:2cf24dba5fb0 (5 bytes)");
    }
}
