//! Snapshot loading and caching — the dataset accessor.
//!
//! Each configured collection maps a contract address to a JSON snapshot
//! file written by the external ingestion job. The store keeps one parsed
//! `Arc<Snapshot>` per collection, keyed on the file's modification time:
//! the ingestion job replaces the file atomically, so a changed mtime means
//! a complete new snapshot. Replacement swaps the `Arc` while in-flight
//! queries keep reading their old handle; no locking is held across I/O of
//! the serving path's pure stages.
//!
//! Unknown contract addresses are validation errors; a missing, unreadable,
//! or malformed file is [`GalleryError::DatasetUnavailable`]. The store
//! never retries — retry policy belongs to the caller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::config::CollectionConfig;
use crate::error::{GalleryError, Result};
use crate::models::Snapshot;

pub struct SnapshotStore {
    /// Lowercased contract address → snapshot path.
    paths: HashMap<String, PathBuf>,
    cache: RwLock<HashMap<String, CachedSnapshot>>,
}

struct CachedSnapshot {
    modified: SystemTime,
    snapshot: Arc<Snapshot>,
}

impl SnapshotStore {
    pub fn new(collections: &[CollectionConfig]) -> Self {
        let paths = collections
            .iter()
            .map(|c| (c.contract_address.to_lowercase(), c.snapshot.clone()))
            .collect();
        Self {
            paths,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// True when the contract address names a configured collection.
    /// Addresses are compared case-insensitively.
    pub fn contains(&self, contract_address: &str) -> bool {
        self.paths.contains_key(&contract_address.to_lowercase())
    }

    /// Loads the snapshot for a collection, serving a cached handle when the
    /// file has not changed since the last read.
    pub fn load(&self, contract_address: &str) -> Result<Arc<Snapshot>> {
        let key = contract_address.to_lowercase();
        let path = self
            .paths
            .get(&key)
            .ok_or_else(|| GalleryError::UnknownCollection(contract_address.to_string()))?;

        let modified = file_mtime(contract_address, path)?;

        {
            let cache = self.cache.read().expect("snapshot cache poisoned");
            if let Some(cached) = cache.get(&key) {
                if cached.modified == modified {
                    return Ok(Arc::clone(&cached.snapshot));
                }
            }
        }

        let snapshot = Arc::new(read_snapshot(contract_address, path)?);
        let mut cache = self.cache.write().expect("snapshot cache poisoned");
        cache.insert(
            key,
            CachedSnapshot {
                modified,
                snapshot: Arc::clone(&snapshot),
            },
        );
        Ok(snapshot)
    }
}

fn file_mtime(collection: &str, path: &Path) -> Result<SystemTime> {
    let meta = std::fs::metadata(path).map_err(|e| GalleryError::DatasetUnavailable {
        collection: collection.to_string(),
        reason: format!("failed to stat '{}': {}", path.display(), e),
    })?;
    meta.modified().map_err(|e| GalleryError::DatasetUnavailable {
        collection: collection.to_string(),
        reason: format!("no modification time for '{}': {}", path.display(), e),
    })
}

fn read_snapshot(collection: &str, path: &Path) -> Result<Snapshot> {
    let content =
        std::fs::read_to_string(path).map_err(|e| GalleryError::DatasetUnavailable {
            collection: collection.to_string(),
            reason: format!("failed to read '{}': {}", path.display(), e),
        })?;
    serde_json::from_str(&content).map_err(|e| GalleryError::DatasetUnavailable {
        collection: collection.to_string(),
        reason: format!("failed to parse '{}': {}", path.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";

    fn write_snapshot(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("ethereum-test.json");
        fs::write(&path, body).unwrap();
        path
    }

    fn store_for(path: PathBuf) -> SnapshotStore {
        SnapshotStore::new(&[CollectionConfig {
            name: "Test".to_string(),
            chain: "ethereum".to_string(),
            contract_address: ADDRESS.to_string(),
            snapshot: path,
        }])
    }

    #[test]
    fn test_load_parses_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_snapshot(
            tmp.path(),
            r##"{"updatedAt":"2023-01-14T00:00:00Z","nfts":[{"token_id":1,"name":"#1","metadata":{"name":"#1","image":"","attributes":{}}}]}"##,
        );
        let store = store_for(path);
        let snapshot = store.load(ADDRESS).unwrap();
        assert_eq!(snapshot.nfts.len(), 1);
        assert_eq!(snapshot.nfts[0].token_id, 1);
    }

    #[test]
    fn test_load_is_case_insensitive_on_address() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_snapshot(tmp.path(), r#"{"updatedAt":"2023-01-14T00:00:00Z","nfts":[]}"#);
        let store = store_for(path);
        assert!(store.load(&ADDRESS.to_uppercase().replace("0X", "0x")).is_ok());
    }

    #[test]
    fn test_unknown_collection_is_validation_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_snapshot(tmp.path(), r#"{"updatedAt":"2023-01-14T00:00:00Z","nfts":[]}"#);
        let store = store_for(path);
        let err = store.load("0x1234").unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, GalleryError::UnknownCollection(_)));
    }

    #[test]
    fn test_missing_file_is_dataset_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_for(tmp.path().join("does-not-exist.json"));
        let err = store.load(ADDRESS).unwrap_err();
        assert!(!err.is_validation());
        assert!(matches!(err, GalleryError::DatasetUnavailable { .. }));
    }

    #[test]
    fn test_malformed_file_is_dataset_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_snapshot(tmp.path(), "{ not json");
        let store = store_for(path);
        let err = store.load(ADDRESS).unwrap_err();
        assert!(matches!(err, GalleryError::DatasetUnavailable { .. }));
    }

    #[test]
    fn test_cache_serves_same_handle_until_file_changes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_snapshot(tmp.path(), r#"{"updatedAt":"2023-01-14T00:00:00Z","nfts":[]}"#);
        let store = store_for(path.clone());

        let first = store.load(ADDRESS).unwrap();
        let second = store.load(ADDRESS).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // Rewrite with a bumped mtime; the next load must pick up the new
        // content while the old handle stays valid.
        fs::write(
            &path,
            r##"{"updatedAt":"2023-02-01T00:00:00Z","nfts":[{"token_id":9,"name":"#9","metadata":{"name":"#9","image":"","attributes":{}}}]}"##,
        )
        .unwrap();
        let future = SystemTime::now() + std::time::Duration::from_secs(5);
        let times = fs::FileTimes::new().set_modified(future);
        let file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.set_times(times).unwrap();

        let third = store.load(ADDRESS).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.nfts.len(), 1);
        assert!(first.nfts.is_empty());
    }
}
