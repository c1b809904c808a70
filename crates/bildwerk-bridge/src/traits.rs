// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend-agnostic trait definitions for the service's collaborators.

use bildwerk_core::error::Result;

/// Content type reported for objects stored without one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An object body and its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Acknowledgement of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReceipt {
    /// SHA-256 of the stored body, lowercase hex.
    pub etag: String,
}

/// Bucket/key addressed blob storage.
pub trait ObjectStore {
    /// Fetch an object. Missing or unreadable objects yield
    /// `BildwerkError::Fetch`.
    fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject>;

    /// Store (or overwrite) an object. Failures yield
    /// `BildwerkError::StorageWrite`.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<ObjectReceipt>;
}

/// Fire-and-forget topic publisher.
pub trait Notifier {
    /// Publish `message` to `topic`, returning the message id.
    /// Failures yield `BildwerkError::Notify`.
    fn publish(&self, topic: &str, message: &str) -> Result<String>;
}
