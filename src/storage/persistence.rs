//! Snapshot persistence for the Thing table.
//!
//! Every write rewrites the whole table to disk through a temp file and a
//! rename, so a crash leaves either the old or the new snapshot in place.

use super::{ThingStore, ThingTable};
use crate::core::{Result, ServiceError};
use crate::model::Thing;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

const SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// Table Snapshot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub version: u32,
    pub last_id: i32,
    pub things: Vec<Thing>,
}

impl TableSnapshot {
    pub fn capture(table: &ThingTable) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            last_id: table.last_id(),
            things: table.rows().cloned().collect(),
        }
    }

    pub fn restore(self) -> Result<ThingTable> {
        if self.version != SNAPSHOT_VERSION {
            return Err(ServiceError::storage(format!(
                "Unsupported snapshot version {}",
                self.version
            )));
        }
        Ok(ThingTable::from_parts(self.things, self.last_id))
    }
}

// ============================================================================
// Snapshot Manager
// ============================================================================

pub struct SnapshotManager {
    snapshot_path: PathBuf,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Writes `snapshot` to a temp file beside the target, syncs it, then
    /// renames it over the target.
    pub async fn save(&self, snapshot: &TableSnapshot) -> Result<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ServiceError::storage(format!("Failed to create snapshot directory: {}", e))
                })?;
            }
        }
        let bytes = serde_json::to_vec_pretty(snapshot)?;

        let temp_path = self.snapshot_path.with_extension("tmp");
        let mut temp_file = File::create(&temp_path)
            .await
            .map_err(|e| ServiceError::storage(format!("Failed to create temp file: {}", e)))?;
        temp_file
            .write_all(&bytes)
            .await
            .map_err(|e| ServiceError::storage(format!("Failed to write snapshot: {}", e)))?;
        temp_file
            .sync_all()
            .await
            .map_err(|e| ServiceError::storage(format!("Failed to sync snapshot: {}", e)))?;
        drop(temp_file);

        fs::rename(&temp_path, &self.snapshot_path)
            .await
            .map_err(|e| ServiceError::storage(format!("Failed to rename snapshot: {}", e)))?;
        Ok(())
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub async fn load(&self) -> Result<Option<TableSnapshot>> {
        let data = match fs::read(&self.snapshot_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ServiceError::storage(format!(
                    "Failed to read snapshot: {}",
                    e
                )));
            }
        };
        let snapshot = serde_json::from_slice(&data)?;
        Ok(Some(snapshot))
    }

}

// ============================================================================
// File-backed store
// ============================================================================

pub struct FileThingStore {
    table: RwLock<ThingTable>,
    snapshots: SnapshotManager,
}

impl FileThingStore {
    /// Opens the store at `path`; a missing file is an empty table.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let snapshots = SnapshotManager::new(path);
        let table = match snapshots.load().await? {
            Some(snapshot) => snapshot.restore()?,
            None => ThingTable::new(),
        };
        debug!(path = %snapshots.path().display(), rows = table.len(), "opened thing snapshot");
        Ok(Self {
            table: RwLock::new(table),
            snapshots,
        })
    }

    async fn flush(&self, table: &ThingTable) -> Result<()> {
        self.snapshots.save(&TableSnapshot::capture(table)).await
    }
}

#[async_trait]
impl ThingStore for FileThingStore {
    async fn all(&self) -> Result<Vec<Thing>> {
        Ok(self.table.read().await.rows().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Thing>> {
        Ok(self.table.read().await.get(id).cloned())
    }

    async fn name_taken(&self, name: &str, except_id: i32) -> Result<bool> {
        Ok(self.table.read().await.name_taken(name, except_id))
    }

    async fn insert(&self, thing: Thing) -> Result<Thing> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let stored = staged.insert(thing)?;
        self.flush(&staged).await?;
        *table = staged;
        Ok(stored)
    }

    async fn update(&self, thing: &Thing) -> Result<u64> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let affected = staged.update(thing);
        if affected > 0 {
            self.flush(&staged).await?;
            *table = staged;
        }
        Ok(affected)
    }

    async fn delete(&self, id: i32) -> Result<u64> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let affected = staged.delete(id);
        if affected > 0 {
            self.flush(&staged).await?;
            *table = staged;
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_snapshot_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("things.json");
        let manager = SnapshotManager::new(&path);
        let mut table = ThingTable::new();
        table.insert(Thing::new("Widget", "blue")).unwrap();

        manager.save(&TableSnapshot::capture(&table)).await.unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let restored = manager.load().await.unwrap().unwrap().restore().unwrap();
        assert_eq!(restored, table);
    }

    #[tokio::test]
    async fn test_missing_snapshot_loads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp_dir.path().join("absent.json"));
        assert_eq!(manager.load().await.unwrap(), None);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let snapshot = TableSnapshot {
            version: 99,
            last_id: 0,
            things: vec![],
        };
        assert!(matches!(snapshot.restore(), Err(ServiceError::Storage(_))));
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("things.json");

        let store = FileThingStore::open(&path).await.unwrap();
        assert!(store.all().await.unwrap().is_empty());
        let widget = store.insert(Thing::new("Widget", "")).await.unwrap();
        let gadget = store.insert(Thing::new("Gadget", "")).await.unwrap();
        assert_eq!(store.delete(gadget.id).await.unwrap(), 1);
        drop(store);

        let reopened = FileThingStore::open(&path).await.unwrap();
        assert_eq!(reopened.all().await.unwrap(), vec![widget]);
        // ids are not reused after a delete
        let next = reopened.insert(Thing::new("Sprocket", "")).await.unwrap();
        assert_eq!(next.id, 3);
    }

    #[tokio::test]
    async fn test_noop_writes_do_not_touch_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("things.json");
        let store = FileThingStore::open(&path).await.unwrap();

        assert_eq!(store.delete(5).await.unwrap(), 0);
        assert_eq!(store.update(&Thing::new("x", "").with_id(5)).await.unwrap(), 0);
        assert!(!path.exists());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_snapshot_write_yields_to_other_tasks() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileThingStore::open(temp_dir.path().join("things.json"))
            .await
            .unwrap();

        // on a single-threaded runtime this task can only run if the write awaits
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let ticker = tokio::spawn(async move {
            flag.store(true, Ordering::SeqCst);
        });

        store.insert(Thing::new("Widget", "")).await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
        ticker.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_flush_leaves_table_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("things.json");
        let store = FileThingStore::open(&path).await.unwrap();
        store.insert(Thing::new("Widget", "")).await.unwrap();

        // a directory where the temp file should go makes the next write fail
        std::fs::create_dir(path.with_extension("tmp")).unwrap();
        let err = store.insert(Thing::new("Gadget", "")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(store.all().await.unwrap().len(), 1);
    }
}
