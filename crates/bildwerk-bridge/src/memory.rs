// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory collaborators for tests and dry runs.
//
// Both types support failure injection so callers can exercise every
// error path without touching a real backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use bildwerk_core::error::{BildwerkError, Result};
use tracing::warn;
use uuid::Uuid;

use crate::digest::etag;
use crate::traits::{Notifier, ObjectReceipt, ObjectStore, StoredObject};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

type Location = (String, String);

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<Location, StoredObject>>,
    failing_gets: Mutex<HashSet<Location>>,
    failing_put_buckets: Mutex<HashSet<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing failure injection.
    pub fn insert(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) {
        lock(&self.objects).insert(
            (bucket.to_owned(), key.to_owned()),
            StoredObject {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
    }

    /// Make subsequent reads of `bucket/key` fail.
    pub fn fail_get(&self, bucket: &str, key: &str) {
        lock(&self.failing_gets).insert((bucket.to_owned(), key.to_owned()));
    }

    /// Make subsequent writes into `bucket` fail.
    pub fn fail_puts_to(&self, bucket: &str) {
        lock(&self.failing_put_buckets).insert(bucket.to_owned());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        lock(&self.objects)
            .get(&(bucket.to_owned(), key.to_owned()))
            .cloned()
    }

    /// Keys currently held in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.objects)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        let location = (bucket.to_owned(), key.to_owned());
        let fetch_error = |detail: &str| BildwerkError::Fetch {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            detail: detail.to_owned(),
        };

        if lock(&self.failing_gets).contains(&location) {
            warn!(bucket, key, "Injected fetch failure");
            return Err(fetch_error("injected failure"));
        }
        lock(&self.objects)
            .get(&location)
            .cloned()
            .ok_or_else(|| fetch_error("no such key"))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<ObjectReceipt> {
        if lock(&self.failing_put_buckets).contains(bucket) {
            warn!(bucket, key, "Injected storage failure");
            return Err(BildwerkError::StorageWrite {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                detail: "injected failure".into(),
            });
        }
        self.insert(bucket, key, body.to_vec(), content_type);
        Ok(ObjectReceipt { etag: etag(body) })
    }
}

/// A message captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub message_id: String,
    pub topic: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct MemoryNotifier {
    published: Mutex<Vec<Published>>,
    failing_topics: Mutex<HashSet<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes to `topic` fail.
    pub fn fail_topic(&self, topic: &str) {
        lock(&self.failing_topics).insert(topic.to_owned());
    }

    /// Snapshot of everything published so far, in order.
    pub fn published(&self) -> Vec<Published> {
        lock(&self.published).clone()
    }
}

impl Notifier for MemoryNotifier {
    fn publish(&self, topic: &str, message: &str) -> Result<String> {
        if lock(&self.failing_topics).contains(topic) {
            warn!(topic, "Injected notify failure");
            return Err(BildwerkError::Notify {
                topic: topic.to_owned(),
                detail: "injected failure".into(),
            });
        }
        let message_id = Uuid::new_v4().to_string();
        lock(&self.published).push(Published {
            message_id: message_id.clone(),
            topic: topic.to_owned(),
            message: message.to_owned(),
        });
        Ok(message_id)
    }
}
