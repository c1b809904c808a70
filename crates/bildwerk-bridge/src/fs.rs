// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem object store.
//
// Layout below the root:
//
//   {bucket}/{key}                 object body
//   .meta/{bucket}/{key}.json      content type, ETag, size, write time
//
// `outbox` is reserved for the notifier sharing the same root and is not a
// valid bucket name.
//
// Objects placed by hand (no sidecar) are served with the default content
// type.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::digest::etag;
use crate::outbox::OUTBOX_DIR;
use crate::traits::{DEFAULT_CONTENT_TYPE, ObjectReceipt, ObjectStore, StoredObject};

const META_DIR: &str = ".meta";

/// Sidecar metadata written next to every stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: String,
    pub etag: String,
    pub size: u64,
    pub stored_at: DateTime<Utc>,
}

/// Object store rooted at a local directory; buckets are subdirectories.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }

    fn metadata_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root
            .join(META_DIR)
            .join(bucket)
            .join(format!("{key}.json"))
    }

    /// Read an object's sidecar, if one exists.
    pub fn metadata(&self, bucket: &str, key: &str) -> Result<Option<ObjectMetadata>> {
        validate_location(bucket, key)?;
        match std::fs::read_to_string(self.metadata_path(bucket, key)) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl ObjectStore for FsObjectStore {
    #[instrument(skip(self))]
    fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        let fetch_error = |detail: String| BildwerkError::Fetch {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            detail,
        };
        validate_location(bucket, key).map_err(|err| fetch_error(err.to_string()))?;

        let bytes = std::fs::read(self.object_path(bucket, key)).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                fetch_error("no such key".into())
            } else {
                fetch_error(err.to_string())
            }
        })?;

        let content_type = self
            .metadata(bucket, key)
            .map_err(|err| fetch_error(format!("unreadable metadata: {err}")))?
            .map(|meta| meta.content_type)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned());

        debug!(size = bytes.len(), %content_type, "Object read");
        Ok(StoredObject {
            bytes,
            content_type,
        })
    }

    #[instrument(skip(self, body), fields(size = body.len()))]
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<ObjectReceipt> {
        let write_error = |detail: String| BildwerkError::StorageWrite {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            detail,
        };
        validate_location(bucket, key).map_err(|err| write_error(err.to_string()))?;

        let metadata = ObjectMetadata {
            content_type: content_type.to_owned(),
            etag: etag(body),
            size: body.len() as u64,
            stored_at: Utc::now(),
        };
        let sidecar =
            serde_json::to_vec_pretty(&metadata).map_err(|err| write_error(err.to_string()))?;

        write_creating_parents(&self.object_path(bucket, key), body)
            .map_err(|err| write_error(err.to_string()))?;
        write_creating_parents(&self.metadata_path(bucket, key), &sidecar)
            .map_err(|err| write_error(err.to_string()))?;

        info!(etag = %metadata.etag, "Object stored");
        Ok(ObjectReceipt {
            etag: metadata.etag,
        })
    }
}

fn write_creating_parents(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)
}

/// Reject bucket names and keys that would escape the store root.
fn validate_location(bucket: &str, key: &str) -> Result<()> {
    if bucket.is_empty()
        || bucket.starts_with('.')
        || bucket.contains(['/', '\\'])
        || bucket == OUTBOX_DIR
    {
        return Err(BildwerkError::Config(format!("invalid bucket name: {bucket:?}")));
    }
    if key.is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(BildwerkError::Config(format!("invalid object key: {key:?}")));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(BildwerkError::Config(format!(
            "object key has an empty or relative segment: {key:?}"
        )));
    }
    Ok(())
}
