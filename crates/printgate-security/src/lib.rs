// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printgate Security — request authentication checks and document
// fingerprints for log correlation.

pub mod bearer;
pub mod integrity;

pub use bearer::{BearerError, validate_authorization};
pub use integrity::PayloadFingerprint;
