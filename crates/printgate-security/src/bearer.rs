// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bearer-token shape check for the `/api/*` routes.
//
// The agent only listens on loopback; the token is a second gate that stops
// unrelated local software from driving the printers by accident.  We check
// that the header carries something shaped like a JWT (three non-empty
// dot-separated segments).  Signature verification belongs to whoever issues
// the token.

use thiserror::Error;

/// Why an `Authorization` header was rejected.  `Display` yields the wire code
/// returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BearerError {
    #[error("missing_authorization_header")]
    Missing,
    #[error("empty_authorization_header")]
    Empty,
    #[error("authorization_not_bearer")]
    NotBearer,
    #[error("token_not_jwt_format")]
    NotJwt,
}

const BEARER_PREFIX: &str = "bearer ";

/// Validate the raw `Authorization` header value, if any.
///
/// Returns the token on success.
pub fn validate_authorization(header: Option<&str>) -> Result<&str, BearerError> {
    let header = header.ok_or(BearerError::Missing)?;
    if header.trim().is_empty() {
        return Err(BearerError::Empty);
    }

    let prefix = header.get(..BEARER_PREFIX.len()).ok_or(BearerError::NotBearer)?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return Err(BearerError::NotBearer);
    }

    let token = header[BEARER_PREFIX.len()..].trim();
    if looks_like_jwt(token) {
        Ok(token)
    } else {
        Err(BearerError::NotJwt)
    }
}

/// header.payload.signature, each part non-empty.
fn looks_like_jwt(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
}
