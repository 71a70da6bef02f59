//! File-backed state store: one JSON document mapping identifiers to
//! attribute sets.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use cirrus_core::state::{StateError, StateStore};
use cirrus_core::AttributeSet;

/// Persists managed-resource state as a single JSON file. Writes are
/// read-modify-write under a lock; suitable for one CLI process, not
/// for shared concurrent writers.
pub struct FileStateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStateStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, AttributeSet>, StateError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StateError::Corrupt(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StateError::Io(e.to_string())),
        }
    }

    async fn store(&self, map: &BTreeMap<String, AttributeSet>) -> Result<(), StateError> {
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|e| StateError::Corrupt(e.to_string()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| StateError::Io(e.to_string()))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn read_state(&self, identifier: &str) -> Result<Option<AttributeSet>, StateError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(identifier))
    }

    async fn write_state(
        &self,
        identifier: &str,
        attrs: &AttributeSet,
    ) -> Result<(), StateError> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        map.insert(identifier.to_string(), attrs.clone());
        debug!(identifier, "state written");
        self.store(&map).await
    }

    async fn delete_state(&self, identifier: &str) -> Result<(), StateError> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        if map.remove(identifier).is_some() {
            debug!(identifier, "state removed");
        }
        self.store(&map).await
    }
}
