//! # In-Memory Object Store
//!
//! `BTreeMap`-backed `ObjectStore` used by the demo binary and the test
//! suites. Writes and deletes can be made to fail on demand to exercise the
//! error paths of the assembler and the cleanup stage.

use super::{Clock, ObjectStore, StorageError, StorageResult, StoredObject, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredEntry {
    body: Vec<u8>,
    last_modified: DateTime<Utc>,
}

#[derive(Debug)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredEntry>>,
    clock: Arc<dyn Clock>,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Store whose modification timestamps come from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            clock,
            fail_writes: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `put` and `copy` fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `delete_objects` fail
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    fn check_writable(&self, operation: &str, key: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::operation(operation, key, "writes disabled"));
        }
        if key.is_empty() || key.ends_with('/') {
            return Err(StorageError::invalid_key(key, "object keys name files, not folders"));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>) -> StorageResult<()> {
        self.check_writable("put", key)?;
        let entry = StoredEntry {
            body,
            last_modified: self.clock.now(),
        };
        self.objects.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .get(key)
            .map(|entry| entry.body.clone())
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        self.check_writable("copy", to_key)?;
        let mut objects = self.objects.write();
        let body = objects
            .get(from_key)
            .map(|entry| entry.body.clone())
            .ok_or_else(|| StorageError::not_found(from_key))?;
        objects.insert(
            to_key.to_string(),
            StoredEntry {
                body,
                last_modified: self.clock.now(),
            },
        );
        Ok(())
    }

    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            let first = keys.first().map(String::as_str).unwrap_or_default();
            return Err(StorageError::operation("delete_objects", first, "deletes disabled"));
        }
        let mut objects = self.objects.write();
        for key in keys {
            objects.remove(key);
        }
        debug!(deleted = keys.len(), "🗑️ Deleted objects");
        Ok(())
    }

    async fn list_by_prefix(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        Ok(self
            .objects
            .read()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| StoredObject {
                key: key.clone(),
                last_modified: entry.last_modified,
            })
            .collect())
    }

    async fn list_subfolders(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let folders: BTreeSet<String> = self
            .objects
            .read()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter_map(|(key, _)| {
                let relative = &key[prefix.len()..];
                relative
                    .split_once('/')
                    .map(|(folder, _)| format!("{prefix}{folder}/"))
            })
            .collect();
        Ok(folders.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_copy() {
        let store = InMemoryObjectStore::new();
        store.put("a/b/file.xml", b"<x/>".to_vec()).await.unwrap();
        store.copy("a/b/file.xml", "c/file.xml").await.unwrap();

        assert_eq!(store.get("c/file.xml").await.unwrap(), b"<x/>".to_vec());
        assert!(store.get("missing").await.unwrap_err().is_not_found());
        assert!(store.copy("missing", "d").await.is_err());
    }

    #[tokio::test]
    async fn test_list_by_prefix_and_subfolders() {
        let store = InMemoryObjectStore::new();
        for key in ["p/1/a/x", "p/1/b/x", "p/2/a/x", "p/10/a/x", "q/1/a/x"] {
            store.put(key, vec![1]).await.unwrap();
        }

        let listed: Vec<String> = store
            .list_by_prefix("p/1/")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.key)
            .collect();
        assert_eq!(listed, vec!["p/1/a/x", "p/1/b/x"]);

        let folders = store.list_subfolders("p/").await.unwrap();
        assert_eq!(folders, vec!["p/1/", "p/10/", "p/2/"]);
        assert!(store.list_subfolders("p/1/a/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = InMemoryObjectStore::new();
        store.put("k/v", vec![]).await.unwrap();

        store.set_fail_writes(true);
        assert!(store.put("k/w", vec![]).await.is_err());
        store.set_fail_deletes(true);
        assert!(store.delete_objects(&["k/v".to_string()]).await.is_err());
        assert!(store.contains("k/v"));

        store.set_fail_deletes(false);
        store.delete_objects(&["k/v".to_string()]).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_folder_keys_rejected() {
        let store = InMemoryObjectStore::new();
        let err = store.put("folder/", vec![]).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }
}
