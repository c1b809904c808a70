// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-bridge — Collaborator abstractions for the stylization service.
//
// The handler talks to storage and notification backends only through the
// traits in `traits`. The filesystem store and JSONL outbox back the CLI;
// the in-memory implementations back tests.

pub mod digest;
pub mod fs;
pub mod memory;
pub mod outbox;
pub mod traits;

pub use fs::FsObjectStore;
pub use memory::{MemoryNotifier, MemoryObjectStore};
pub use outbox::{OutboxMessage, OutboxNotifier};
pub use traits::{DEFAULT_CONTENT_TYPE, Notifier, ObjectReceipt, ObjectStore, StoredObject};
