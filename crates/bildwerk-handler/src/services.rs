// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service holder — the collaborator handles and configuration, created once
// at process start and passed to every batch.

use std::sync::Arc;

use bildwerk_bridge::{FsObjectStore, Notifier, ObjectStore, OutboxNotifier};
use bildwerk_core::HandlerConfig;
use bildwerk_core::error::Result;
use tracing::info;

/// Long-lived resources shared by every invocation.
///
/// Cheap to clone; the collaborators are reference-counted.
#[derive(Clone)]
pub struct Services {
    store: Arc<dyn ObjectStore + Send + Sync>,
    notifier: Arc<dyn Notifier + Send + Sync>,
    config: HandlerConfig,
}

impl Services {
    pub fn new(
        store: Arc<dyn ObjectStore + Send + Sync>,
        notifier: Arc<dyn Notifier + Send + Sync>,
        config: HandlerConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Validate `config` and open the filesystem store and outbox below its
    /// storage root.
    pub fn init(config: HandlerConfig) -> Result<Self> {
        config.validate()?;
        let root = config.storage_root.clone();
        info!(root = %root.display(), "Initialising services");

        Ok(Self::new(
            Arc::new(FsObjectStore::new(&root)),
            Arc::new(OutboxNotifier::new(&root)),
            config,
        ))
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::BildwerkError;

    #[test]
    fn init_rejects_invalid_config() {
        let config = HandlerConfig {
            topic: String::new(),
            ..HandlerConfig::default()
        };
        assert!(matches!(Services::init(config), Err(BildwerkError::Config(_))));
    }

    #[test]
    fn init_uses_storage_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = HandlerConfig {
            storage_root: dir.path().to_path_buf(),
            ..HandlerConfig::default()
        };
        let services = Services::init(config).unwrap();

        services
            .store()
            .put_object("b", "k.txt", b"hi", "text/plain")
            .unwrap();
        assert!(dir.path().join("b/k.txt").exists());

        services.notifier().publish("t", "m").unwrap();
        assert!(dir.path().join("outbox/t.jsonl").exists());
    }
}
