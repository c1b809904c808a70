// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Object fingerprints — SHA-256 ETags for stored bodies.

use sha2::{Digest, Sha256};

/// ETag for `body`: its SHA-256 digest as lowercase hex.
pub fn etag(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hex::encode(hasher.finalize())
}
